use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Outcome of one executed request. Never mutated after it is produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status_code: u16,
    pub status_text: String,
    pub time_ms: u64,
    pub size_bytes: u64,
    pub body: Value,
}

impl Response {
    /// Synthetic response standing in for a request that never got an answer.
    pub fn transport_failure(message: &str, time_ms: u64) -> Self {
        Self {
            status_code: TRANSPORT_FAILURE_STATUS,
            status_text: String::from("Network Error"),
            time_ms,
            size_bytes: 0,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == TRANSPORT_FAILURE_STATUS
    }
}
