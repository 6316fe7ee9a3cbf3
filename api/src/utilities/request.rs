use crate::domain::request::HttpMethod;
use reqwest::Method;

pub fn convert_http_method(input: HttpMethod) -> Method {
    match input {
        HttpMethod::GET => Method::GET,
        HttpMethod::POST => Method::POST,
        HttpMethod::PUT => Method::PUT,
        HttpMethod::DELETE => Method::DELETE,
        HttpMethod::PATCH => Method::PATCH,
    }
}

/// GET requests go out without a body, everything else sends it when present.
pub fn sends_body(method: HttpMethod, body: &str) -> bool {
    method != HttpMethod::GET && !body.is_empty()
}
