use super::{
    request::{HttpMethod, Request, RequestDraft},
    response::Response,
    suggestion::Suggestion,
};

/// The transaction currently being worked on by the orchestrator.
///
/// History entries are copied out of this value, never aliased back into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tab {
    pub draft: RequestDraft,
    pub request: Option<Request>,
    pub response: Option<Response>,
    pub suggestion: Option<Suggestion>,
}
impl Tab {
    pub fn new(default_method: HttpMethod) -> Self {
        Self {
            draft: RequestDraft::empty(default_method),
            request: None,
            response: None,
            suggestion: None,
        }
    }

    /// Replaces the executed pair and forgets any suggestion for the old pair.
    pub fn load(&mut self, request: Request, response: Response) {
        self.request = Some(request);
        self.response = Some(response);
        self.suggestion = None;
    }
}
impl Default for Tab {
    fn default() -> Self {
        Self::new(HttpMethod::default())
    }
}
