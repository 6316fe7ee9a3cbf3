use std::sync::Arc;

use pulse_api::{
  db::HISTORY_KEY, HistoryEntry, HistoryStore, KeyValues, MemoryStore, Persistence, PulseDb,
  RequestDraft,
};

use crate::helpers::users_response;

fn entry(method: &str, url: &str) -> HistoryEntry {
  let request = RequestDraft {
    method: method.into(),
    url: url.into(),
    headers: KeyValues::default(),
    params: KeyValues::default(),
    body: "".into(),
  }
  .finalize()
  .expect("test draft should be valid");
  HistoryEntry::new(request, Some(users_response()))
}

#[tokio::test]
async fn list_after_appends_is_newest_first() {
  let store = HistoryStore::load(Arc::new(MemoryStore::new())).await;
  let appended = vec![
    entry("GET", "https://api.example.com/1"),
    entry("POST", "https://api.example.com/2"),
    entry("DELETE", "https://api.example.com/3"),
  ];
  for e in appended.iter().cloned() {
    store.append(e).await;
  }

  let listed: Vec<HistoryEntry> = store.list(None).await.iter().cloned().collect();

  assert_eq!(listed.len(), 3);
  let expected: Vec<HistoryEntry> = appended.into_iter().rev().collect();
  assert_eq!(listed, expected);
}

#[tokio::test]
async fn clear_after_appends_leaves_nothing() {
  let persistence = Arc::new(MemoryStore::new());
  let store = HistoryStore::load(persistence.clone()).await;
  store.append(entry("GET", "https://api.example.com/1")).await;
  store.append(entry("GET", "https://api.example.com/2")).await;

  store.clear().await;

  assert!(store.list(None).await.is_empty());
  assert_eq!(store.list(Some("GET")).await.count(), 0);
  let persisted = persistence.load(HISTORY_KEY).await.unwrap().unwrap();
  assert_eq!(persisted, b"[]".to_vec());
}

#[tokio::test]
async fn every_append_is_persisted_immediately() {
  let persistence = Arc::new(MemoryStore::new());
  let store = HistoryStore::load(persistence.clone()).await;
  store.append(entry("GET", "https://api.example.com/1")).await;
  store.append(entry("PUT", "https://api.example.com/2")).await;

  assert_eq!(persistence.save_count(), 2);
  let reloaded = HistoryStore::load(persistence).await;
  assert_eq!(reloaded.len().await, 2);
}

#[tokio::test]
async fn history_survives_a_restart_on_sqlite() {
  let dir = tempfile::tempdir().unwrap();
  let db_path = dir.path().join("pulse.sqlite");
  let db_path = db_path.to_str().unwrap();
  let first = entry("PATCH", "https://api.example.com/users/7");

  {
    let db = Arc::new(PulseDb::new(db_path).await.unwrap());
    let store = HistoryStore::load(db).await;
    store.append(first.clone()).await;
  }

  let db = Arc::new(PulseDb::new(db_path).await.unwrap());
  let store = HistoryStore::load(db).await;
  let view = store.list(None).await;
  assert_eq!(view.count(), 1);
  assert_eq!(view.first(), Some(&first));
}
