use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{request::Request, response::Response};

/// One executed request as kept in the history log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub request: Request,
    pub response: Option<Response>,
    pub executed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(request: Request, response: Option<Response>) -> Self {
        Self {
            request,
            response,
            executed_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.request.id
    }

    /// Case-insensitive substring match against the url or the method.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.request.url.to_lowercase().contains(&needle)
            || self.request.method.to_string().to_lowercase().contains(&needle)
    }
}
