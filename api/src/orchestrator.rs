//! Drives one request through compose → run → result → analysis.
//!
//! All state lives in a single `Session` behind a mutex. The mutex is never
//! held while the transport or the reasoning service is awaited, so a second
//! caller observes `Running`/`Analyzing` and is turned away with
//! `OrchestratorError::Busy` instead of queueing.
//!
//! The awaited part of `submit` and `analyze` runs on a spawned task that
//! also records the outcome. Dropping the caller's future does not leave the
//! session stuck in `Running` or `Analyzing`.

use std::{sync::Arc, time::Instant};

use log::{debug, error, info, warn};
use secrecy::ExposeSecret;
use tokio::{sync::Mutex, task::JoinError};
use uuid::Uuid;

use crate::{
    analysis::{AnalysisClient, ReasoningService},
    config::Config,
    credentials::CredentialStore,
    db::Persistence,
    domain::{
        request::{HttpMethod, Request, RequestDraft},
        request_item::HistoryEntry,
        response::Response,
        suggestion::Suggestion,
        tab::Tab,
        ui::{Event, State},
    },
    error::{MissingCredential, OrchestratorError},
    history::{HistoryStore, HistoryView},
    transport::HttpTransport,
};

struct Session {
    state: State,
    tab: Tab,
}

impl Session {
    /// Looks the event up in the transition table without applying it.
    fn check(&self, event: Event) -> Result<State, OrchestratorError> {
        match self.state.next(event) {
            Some(next) => Ok(next),
            None if self.state.is_busy() => Err(OrchestratorError::Busy(self.state)),
            None => Err(OrchestratorError::InvalidTransition {
                from: self.state,
                event,
            }),
        }
    }

    fn apply(&mut self, event: Event) -> Result<State, OrchestratorError> {
        let next = self.check(event)?;
        debug!("{} --{}--> {}", self.state, event, next);
        self.state = next;
        Ok(next)
    }
}

/// Puts a session whose background task died back into `fallback`.
async fn recover(session: &Mutex<Session>, fallback: State, e: JoinError) -> OrchestratorError {
    error!("background task failed: {}", e);
    let mut session = session.lock().await;
    if session.state.is_busy() {
        warn!("{} --recover--> {}", session.state, fallback);
        session.state = fallback;
    }
    OrchestratorError::TaskFailed(e.to_string())
}

pub struct Orchestrator {
    session: Arc<Mutex<Session>>,
    default_method: HttpMethod,
    transport: Arc<dyn HttpTransport>,
    analyzer: Arc<AnalysisClient>,
    history: Arc<HistoryStore>,
    credentials: CredentialStore,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        analyzer: AnalysisClient,
        history: HistoryStore,
        credentials: CredentialStore,
        default_method: HttpMethod,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                state: State::Home,
                tab: Tab::new(default_method),
            })),
            default_method,
            transport,
            analyzer: Arc::new(analyzer),
            history: Arc::new(history),
            credentials,
        }
    }

    /// Wires an orchestrator whose history and credential share `persistence`.
    pub async fn with_persistence(
        config: &Config,
        persistence: Arc<dyn Persistence>,
        transport: Arc<dyn HttpTransport>,
        service: Arc<dyn ReasoningService>,
    ) -> Self {
        let history = HistoryStore::load(Arc::clone(&persistence)).await;
        let credentials = CredentialStore::load(persistence).await;
        let analyzer =
            AnalysisClient::new(service, &config.model).with_body_budget(config.body_budget);
        Self::new(transport, analyzer, history, credentials, config.default_method)
    }

    pub async fn state(&self) -> State {
        self.session.lock().await.state
    }

    /// Copy of the transaction currently being worked on.
    pub async fn current(&self) -> Tab {
        self.session.lock().await.tab.clone()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub async fn has_credential(&self) -> bool {
        self.credentials.is_configured().await
    }

    /// Home → Composing with an empty draft.
    pub async fn start(&self) -> Result<RequestDraft, OrchestratorError> {
        let mut session = self.session.lock().await;
        session.apply(Event::Start)?;
        session.tab = Tab::new(self.default_method);
        Ok(session.tab.draft.clone())
    }

    /// Validates and executes `draft`, recording the outcome in history.
    ///
    /// A draft that fails validation leaves the state in `Composing`. A
    /// transport failure still ends in `Result`, carrying a synthetic
    /// response with status 0.
    pub async fn submit(&self, draft: RequestDraft) -> Result<Response, OrchestratorError> {
        let request = {
            let mut session = self.session.lock().await;
            session.check(Event::Submit)?;
            session.tab.draft = draft;
            let request = session.tab.draft.finalize().map_err(|e| {
                info!("rejected draft: {}", e);
                e
            })?;
            session.apply(Event::Submit)?;
            request
        };

        let transport = Arc::clone(&self.transport);
        let history = Arc::clone(&self.history);
        let session = Arc::clone(&self.session);
        let run = tokio::spawn(async move {
            let started = Instant::now();
            let response = match transport.execute(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("{} {} failed: {}", request.method, request.url, e);
                    Response::transport_failure(&e.to_string(), started.elapsed().as_millis() as u64)
                }
            };
            info!(
                "{} {} -> {} in {}ms",
                request.method, request.url, response.status_code, response.time_ms
            );

            history
                .append(HistoryEntry::new(request.clone(), Some(response.clone())))
                .await;

            let mut session = session.lock().await;
            session.apply(Event::Complete)?;
            session.tab.load(request, response.clone());
            Ok::<_, OrchestratorError>(response)
        });
        match run.await {
            Ok(outcome) => outcome,
            Err(e) => Err(recover(&self.session, State::Composing, e).await),
        }
    }

    /// Result → Composing, seeded with the last executed request.
    pub async fn retry(&self) -> Result<RequestDraft, OrchestratorError> {
        let mut session = self.session.lock().await;
        session.check(Event::Retry)?;
        if let Some(request) = &session.tab.request {
            session.tab.draft = RequestDraft::from(request);
        }
        session.apply(Event::Retry)?;
        Ok(session.tab.draft.clone())
    }

    /// Result → Analyzing → Suggestion.
    ///
    /// Without a configured credential the state moves to `MissingCredential`
    /// and nothing is sent. Every other failure yields the fallback suggestion.
    pub async fn analyze(&self) -> Result<Suggestion, OrchestratorError> {
        let (request, response, credential) = {
            let mut session = self.session.lock().await;
            session.check(Event::Analyze)?;
            let credential = self.credentials.current().await;
            if credential.expose_secret().is_empty() {
                session.apply(Event::CredentialMissing)?;
                return Err(MissingCredential.into());
            }
            let (request, response) = match (&session.tab.request, &session.tab.response) {
                (Some(request), Some(response)) => (request.clone(), response.clone()),
                _ => {
                    return Err(OrchestratorError::InvalidTransition {
                        from: session.state,
                        event: Event::Analyze,
                    })
                }
            };
            session.apply(Event::Analyze)?;
            (request, response, credential)
        };

        let analyzer = Arc::clone(&self.analyzer);
        let session = Arc::clone(&self.session);
        let run = tokio::spawn(async move {
            let outcome = analyzer.analyze(&request, &response, &credential).await;

            let mut session = session.lock().await;
            match outcome {
                Ok(suggestion) => {
                    session.apply(Event::AnalysisDone)?;
                    session.tab.suggestion = Some(suggestion.clone());
                    Ok::<_, OrchestratorError>(suggestion)
                }
                Err(e) => {
                    session.apply(Event::CredentialMissing)?;
                    Err(e.into())
                }
            }
        });
        match run.await {
            Ok(outcome) => outcome,
            Err(e) => Err(recover(&self.session, State::Result, e).await),
        }
    }

    /// Stores the credential. Leaves `MissingCredential` once a key is usable.
    pub async fn provide_credential(&self, key: String) -> anyhow::Result<State> {
        self.credentials.set(key).await?;
        let mut session = self.session.lock().await;
        if session.state == State::MissingCredential && self.credentials.is_configured().await {
            session.apply(Event::CredentialProvided)?;
        }
        Ok(session.state)
    }

    /// Opens the history list without touching the current transaction.
    pub async fn open_history(&self, filter: Option<&str>) -> Result<HistoryView, OrchestratorError> {
        self.session.lock().await.apply(Event::OpenHistory)?;
        Ok(self.history.list(filter).await)
    }

    /// History → Result with the entry's request and response loaded.
    pub async fn select_history(&self, id: Uuid) -> Result<(Request, Response), OrchestratorError> {
        let mut session = self.session.lock().await;
        session.check(Event::Select)?;
        let entry = self
            .history
            .get(id)
            .await
            .ok_or(OrchestratorError::UnknownHistoryEntry(id))?;
        let response = entry
            .response
            .unwrap_or_else(|| Response::transport_failure("no response was recorded", 0));
        session.tab.draft = RequestDraft::from(&entry.request);
        session.tab.load(entry.request.clone(), response.clone());
        session.apply(Event::Select)?;
        Ok((entry.request, response))
    }

    pub async fn clear_history(&self) -> Result<(), OrchestratorError> {
        let mut session = self.session.lock().await;
        session.apply(Event::ClearHistory)?;
        self.history.clear().await;
        Ok(())
    }

    pub async fn go_home(&self) -> Result<(), OrchestratorError> {
        self.session.lock().await.apply(Event::GoHome)?;
        Ok(())
    }
}
