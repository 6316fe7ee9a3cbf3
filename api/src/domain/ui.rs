use serde::{Deserialize, Serialize};

/// The screen the orchestrator is currently on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Home,
    Composing,
    Running,
    Result,
    Analyzing,
    Suggestion,
    History,
    MissingCredential,
}
impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Start,
    Submit,
    Complete,
    Analyze,
    AnalysisDone,
    CredentialMissing,
    CredentialProvided,
    Retry,
    OpenHistory,
    Select,
    ClearHistory,
    GoHome,
}
impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl State {
    /// Transition table. `None` means the event is not accepted in this state.
    pub fn next(self, event: Event) -> Option<State> {
        use Event::*;
        use State::*;
        match (self, event) {
            (Home, Start) => Some(Composing),
            (Composing, Submit) => Some(Running),
            (Running, Complete) => Some(Result),
            (Result, Analyze) => Some(Analyzing),
            (Result | Analyzing, CredentialMissing) => Some(MissingCredential),
            (MissingCredential, CredentialProvided) => Some(Result),
            (Analyzing, AnalysisDone) => Some(Suggestion),
            (Result, Retry) => Some(Composing),
            (Home | Result | Suggestion, OpenHistory) => Some(History),
            (History, Select) => Some(Result),
            (History, ClearHistory) => Some(History),
            (Running | Analyzing, GoHome) => None,
            (_, GoHome) => Some(Home),
            _ => None,
        }
    }

    /// True while an execution or an analysis is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, State::Running | State::Analyzing)
    }
}
