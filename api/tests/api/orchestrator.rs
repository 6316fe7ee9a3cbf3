use std::time::Duration;

use pulse_api::{OrchestratorError, State};

use crate::helpers::{
  spawn_app_with, spawn_app_with_service, spawn_test_app, users_draft, users_response,
  wait_for_state, ScriptedService, ScriptedTransport, SUGGESTION_JSON,
};

#[tokio::test]
async fn get_users_reaches_result_and_records_one_entry() {
  let test_app = spawn_test_app().await;
  let app = &test_app.app;
  app.start().await.unwrap();

  let response = app.submit(users_draft()).await.unwrap();

  assert_eq!(response, users_response());
  assert_eq!(app.state().await, State::Result);
  let current = app.current().await;
  assert_eq!(current.response, Some(users_response()));
  let view = app.history().list(None).await;
  assert_eq!(view.count(), 1);
  let entry = view.first().unwrap();
  assert_eq!(entry.request.url, "https://api.example.com/v1/users");
  assert_eq!(Some(&entry.request), current.request.as_ref());
  assert_eq!(entry.response, Some(users_response()));
}

#[tokio::test]
async fn second_submission_while_running_is_rejected() {
  let test_app = spawn_app_with(ScriptedTransport::gated(users_response()), SUGGESTION_JSON).await;
  let app = test_app.app.clone();
  app.start().await.unwrap();

  let first = tokio::spawn(async move { app.submit(users_draft()).await });
  test_app.transport.started.notified().await;
  assert_eq!(test_app.app.state().await, State::Running);

  let second = test_app.app.submit(users_draft()).await;
  assert_eq!(second, Err(OrchestratorError::Busy(State::Running)));

  test_app.transport.release.add_permits(1);
  let first = first.await.unwrap().unwrap();
  assert_eq!(first, users_response());
  assert_eq!(test_app.app.state().await, State::Result);
  assert_eq!(test_app.transport.call_count(), 1);
  assert_eq!(test_app.app.history().len().await, 1);
}

#[tokio::test]
async fn selecting_the_same_entry_twice_is_idempotent() {
  let test_app = spawn_test_app().await;
  let app = &test_app.app;
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();
  app.go_home().await.unwrap();

  let id = app.open_history(None).await.unwrap().first().unwrap().id();
  let saves_before = test_app.store.save_count();
  let first = app.select_history(id).await.unwrap();
  let first_tab = app.current().await;
  app.open_history(None).await.unwrap();
  let second = app.select_history(id).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(first_tab, app.current().await);
  assert_eq!(app.state().await, State::Result);
  assert_eq!(test_app.store.save_count(), saves_before);
  assert_eq!(app.history().len().await, 1);
  assert_eq!(test_app.transport.call_count(), 1);
}

#[tokio::test]
async fn history_does_not_consume_the_active_transaction() {
  let test_app = spawn_test_app().await;
  let app = &test_app.app;
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();
  let before = app.current().await;

  app.open_history(Some("users")).await.unwrap();

  assert_eq!(app.state().await, State::History);
  assert_eq!(app.current().await, before);
}

#[tokio::test]
async fn analysis_with_key_reaches_suggestion() {
  let test_app = spawn_test_app().await;
  let app = &test_app.app;
  app.provide_credential(String::from("test-key")).await.unwrap();
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();

  let suggestion = app.analyze().await.unwrap();

  assert_eq!(suggestion.documentation, "Returns the list of users.");
  assert_eq!(suggestion.security, vec![String::from("Require an Authorization header")]);
  assert_eq!(app.state().await, State::Suggestion);
  assert_eq!(test_app.service.call_count(), 1);
}

#[tokio::test]
async fn analysis_without_key_never_calls_the_service() {
  let test_app = spawn_test_app().await;
  let app = &test_app.app;
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();

  let err = app.analyze().await.unwrap_err();

  assert!(matches!(err, OrchestratorError::MissingCredential(_)));
  assert_eq!(app.state().await, State::MissingCredential);
  assert_eq!(test_app.service.call_count(), 0);
}

#[tokio::test]
async fn garbage_from_the_service_yields_the_fallback() {
  let test_app = spawn_app_with(ScriptedTransport::new(users_response()), "<html>oops</html>").await;
  let app = &test_app.app;
  app.provide_credential(String::from("test-key")).await.unwrap();
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();

  let suggestion = app.analyze().await.unwrap();

  assert_eq!(suggestion.documentation, "Failed to generate documentation.");
  assert!(suggestion.security.is_empty());
  assert_eq!(suggestion.schema_updates, "N/A");
  assert_eq!(app.state().await, State::Suggestion);
}

#[tokio::test]
async fn dropped_submission_still_reaches_result() {
  let test_app = spawn_app_with(ScriptedTransport::gated(users_response()), SUGGESTION_JSON).await;
  let app = &test_app.app;
  app.start().await.unwrap();

  let abandoned = tokio::time::timeout(Duration::from_millis(50), app.submit(users_draft())).await;
  assert!(abandoned.is_err());
  assert_eq!(app.go_home().await, Err(OrchestratorError::Busy(State::Running)));

  test_app.transport.release.add_permits(1);
  wait_for_state(app, State::Result).await;

  assert_eq!(app.current().await.response, Some(users_response()));
  assert_eq!(app.history().len().await, 1);
  app.go_home().await.unwrap();
  assert_eq!(app.state().await, State::Home);
}

#[tokio::test]
async fn dropped_analysis_still_reaches_suggestion() {
  let test_app = spawn_app_with_service(
    ScriptedTransport::new(users_response()),
    ScriptedService::gated(SUGGESTION_JSON),
  )
  .await;
  let app = &test_app.app;
  app.provide_credential(String::from("test-key")).await.unwrap();
  app.start().await.unwrap();
  app.submit(users_draft()).await.unwrap();

  let abandoned = tokio::time::timeout(Duration::from_millis(50), app.analyze()).await;
  assert!(abandoned.is_err());
  assert_eq!(app.state().await, State::Analyzing);

  test_app.service.release.add_permits(1);
  wait_for_state(app, State::Suggestion).await;

  let suggestion = app.current().await.suggestion.unwrap();
  assert_eq!(suggestion.documentation, "Returns the list of users.");
  assert_eq!(test_app.service.call_count(), 1);
  app.go_home().await.unwrap();
}
