use crate::domain::response::Response;
use log::debug;
use reqwest::StatusCode;
use serde_json::Value;

/// Turns a raw http answer into a `Response`, parsing the body by content type.
///
/// JSON bodies become structured values. Anything else, including JSON that
/// fails to parse, is kept as a string value; an empty body is `null`.
pub fn build_response(res_type: &str, res_status: StatusCode, res_bytes: &[u8], time_ms: u64) -> Response {
    Response {
        status_code: res_status.as_u16(),
        status_text: res_status.canonical_reason().unwrap_or_default().to_string(),
        time_ms,
        size_bytes: res_bytes.len() as u64,
        body: parse_body(res_type, res_bytes),
    }
}

fn parse_body(res_type: &str, res_bytes: &[u8]) -> Value {
    if res_bytes.is_empty() {
        return Value::Null;
    }
    let is_json = res_type
        .split(';')
        .next()
        .map(|mime| mime.trim().ends_with("json"))
        .unwrap_or(false);
    if is_json {
        match serde_json::from_slice(res_bytes) {
            Ok(value) => return value,
            Err(e) => debug!("content-type {} but body is not json: {}", res_type, e),
        }
    }
    Value::String(String::from_utf8_lossy(res_bytes).into_owned())
}
