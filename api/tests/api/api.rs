use pulse_api::{
  analysis::{AnalysisError, GeminiService, ReasoningService, DEFAULT_MODEL},
  AnalysisClient, HttpTransport, KeyValue, KeyValues, RequestDraft, ReqwestTransport, Suggestion,
};
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use wiremock::{
  matchers::{body_string, header, method, path, query_param},
  Mock, MockServer, ResponseTemplate,
};

use crate::helpers::{users_response, SUGGESTION_JSON};

fn draft(method: &str, url: String) -> RequestDraft {
  RequestDraft {
    method: method.into(),
    url,
    headers: KeyValues(vec![
      KeyValue::new("X-Trace", "abc"),
      KeyValue::new("", "ignored"),
    ]),
    params: KeyValues(vec![KeyValue::new("page", "2"), KeyValue::new("", "1")]),
    body: String::from(r#"{"name":"ada"}"#),
  }
}

fn gemini_answer(text: &str) -> serde_json::Value {
  json!({
    "candidates": [
      { "content": { "role": "model", "parts": [ { "text": text } ] } }
    ]
  })
}

#[tokio::test]
async fn transport_sends_headers_params_and_body() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/users"))
    .and(query_param("page", "2"))
    .and(header("X-Trace", "abc"))
    .and(body_string(r#"{"name":"ada"}"#))
    .respond_with(
      ResponseTemplate::new(201).set_body_raw(r#"{"id":7}"#, "application/json"),
    )
    .expect(1)
    .mount(&server)
    .await;

  let request = draft("POST", format!("{}/v1/users", server.uri()))
    .finalize()
    .unwrap();
  let response = ReqwestTransport::new().execute(&request).await.unwrap();

  assert_eq!(response.status_code, 201);
  assert_eq!(response.status_text, "Created");
  assert_eq!(response.body, json!({"id": 7}));
  assert_eq!(response.size_bytes, 8);
}

#[tokio::test]
async fn transport_reports_http_errors_as_responses() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(404).set_body_raw("missing", "text/plain"))
    .mount(&server)
    .await;

  let request = draft("GET", format!("{}/v1/nothing", server.uri()))
    .finalize()
    .unwrap();
  let response = ReqwestTransport::new().execute(&request).await.unwrap();

  assert_eq!(response.status_code, 404);
  assert!(!response.is_success());
  assert_eq!(response.body, json!("missing"));
}

#[tokio::test]
async fn transport_fails_without_a_server() {
  let server = MockServer::start().await;
  let url = format!("{}/gone", server.uri());
  drop(server);

  let request = draft("GET", url).finalize().unwrap();
  assert!(ReqwestTransport::new().execute(&request).await.is_err());
}

#[tokio::test]
async fn gemini_request_carries_key_and_schema() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path(format!("/v1beta/models/{}:generateContent", DEFAULT_MODEL)))
    .and(header("x-goog-api-key", "test-key-value"))
    .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(SUGGESTION_JSON)))
    .expect(1)
    .mount(&server)
    .await;

  let service = GeminiService::new_with_base_url(&server.uri());
  let text = service
    .generate(
      "prompt",
      &json!({"type": "OBJECT"}),
      DEFAULT_MODEL,
      &SecretString::from(String::from("test-key-value")),
    )
    .await
    .unwrap();
  assert_eq!(text, SUGGESTION_JSON);

  let received = server.received_requests().await.unwrap();
  let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
  assert_eq!(sent["generationConfig"]["responseMimeType"], "application/json");
  assert_eq!(sent["generationConfig"]["responseSchema"], json!({"type": "OBJECT"}));
  assert_eq!(sent["contents"][0]["parts"][0]["text"], "prompt");
}

#[tokio::test]
async fn gemini_error_status_becomes_fallback() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
    .mount(&server)
    .await;

  let client = AnalysisClient::new(
    Arc::new(GeminiService::new_with_base_url(&server.uri())),
    DEFAULT_MODEL,
  );
  let request = draft("GET", String::from("https://api.example.com/v1/users"))
    .finalize()
    .unwrap();
  let key = SecretString::from(String::from("bad-key"));

  let err = client
    .try_analyze(&request, &users_response(), &key)
    .await
    .unwrap_err();
  assert!(matches!(err, AnalysisError::Service { status: 403, .. }));
  let suggestion = client.analyze(&request, &users_response(), &key).await.unwrap();
  assert_eq!(suggestion, Suggestion::fallback());
}

#[tokio::test]
async fn gemini_empty_candidates_become_fallback() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
    .mount(&server)
    .await;

  let client = AnalysisClient::new(
    Arc::new(GeminiService::new_with_base_url(&server.uri())),
    DEFAULT_MODEL,
  );
  let request = draft("GET", String::from("https://api.example.com/v1/users"))
    .finalize()
    .unwrap();
  let key = SecretString::from(String::from("key"));

  let err = client
    .try_analyze(&request, &users_response(), &key)
    .await
    .unwrap_err();
  assert!(matches!(err, AnalysisError::EmptyResponse));
  assert!(client
    .analyze(&request, &users_response(), &key)
    .await
    .unwrap()
    .is_fallback());
}

#[tokio::test]
async fn gemini_suggestion_is_parsed() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer(SUGGESTION_JSON)))
    .mount(&server)
    .await;

  let client = AnalysisClient::new(
    Arc::new(GeminiService::new_with_base_url(&server.uri())),
    DEFAULT_MODEL,
  );
  let request = draft("GET", String::from("https://api.example.com/v1/users"))
    .finalize()
    .unwrap();
  let suggestion = client
    .analyze(&request, &users_response(), &SecretString::from(String::from("key")))
    .await
    .unwrap();

  assert_eq!(suggestion.improvements, vec![String::from("Add pagination")]);
  assert_eq!(suggestion.code_snippet, "fetch('https://api.example.com/v1/users')");
}
