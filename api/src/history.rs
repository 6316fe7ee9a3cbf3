//! Append-only log of executed requests, persisted after every mutation.
//!
//! The log is stored oldest-first and handed out newest-first. Every
//! mutation writes the whole log under a single key, so the persisted
//! value always equals the result of the last successful `append`/`clear`.
//! A failed save is logged and the in-memory log changes anyway.
//!
//! Each `append` copies the log and rewrites it in full, so its cost grows
//! linearly with the number of entries.

use std::{iter::Rev, slice, sync::Arc};

use log::{error, info, warn};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{Persistence, HISTORY_KEY},
    domain::request_item::HistoryEntry,
};

pub struct HistoryStore {
    entries: RwLock<Arc<[HistoryEntry]>>,
    persistence: Arc<dyn Persistence>,
}

impl HistoryStore {
    /// Restores the log from `persistence`. Unreadable payloads start an empty log.
    pub async fn load(persistence: Arc<dyn Persistence>) -> Self {
        let entries: Vec<HistoryEntry> = match persistence.load(HISTORY_KEY).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("discarding unreadable history: {}", e);
                vec![]
            }),
            Ok(None) => vec![],
            Err(e) => {
                error!("could not load history: {:#}", e);
                vec![]
            }
        };
        info!("loaded {} history entries", entries.len());
        Self {
            entries: RwLock::new(entries.into()),
            persistence,
        }
    }

    /// Adds `entry` to the end of the log and persists it.
    pub async fn append(&self, entry: HistoryEntry) {
        let mut guard = self.entries.write().await;
        let mut next = guard.to_vec();
        next.push(entry);
        let next: Arc<[HistoryEntry]> = next.into();
        self.persist(&next).await;
        *guard = next;
        info!("history now holds {} entries", guard.len());
    }

    /// Snapshot of the log, newest first, optionally filtered by url or method.
    pub async fn list(&self, filter: Option<&str>) -> HistoryView {
        HistoryView {
            entries: Arc::clone(&*self.entries.read().await),
            filter: filter
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_lowercase),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id() == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes every entry at once and persists the empty log.
    pub async fn clear(&self) {
        let mut guard = self.entries.write().await;
        let empty: Arc<[HistoryEntry]> = Arc::new([]);
        self.persist(&empty).await;
        *guard = empty;
        info!("history cleared");
    }

    // Called with the write lock held so readers never observe a state
    // that differs from what was handed to storage.
    async fn persist(&self, entries: &[HistoryEntry]) {
        let bytes = match serde_json::to_vec(entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("could not serialize history: {}", e);
                return;
            }
        };
        if let Err(e) = self.persistence.save(HISTORY_KEY, &bytes).await {
            error!("could not persist history: {:#}", e);
        }
    }
}

/// Immutable, restartable view over a history snapshot.
#[derive(Clone, Debug)]
pub struct HistoryView {
    entries: Arc<[HistoryEntry]>,
    filter: Option<String>,
}

impl HistoryView {
    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter {
            inner: self.entries.iter().rev(),
            filter: self.filter.as_deref(),
        }
    }

    pub fn first(&self) -> Option<&HistoryEntry> {
        self.iter().next()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }
}

pub struct HistoryIter<'a> {
    inner: Rev<slice::Iter<'a, HistoryEntry>>,
    filter: Option<&'a str>,
}

impl<'a> Iterator for HistoryIter<'a> {
    type Item = &'a HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner
            .by_ref()
            .find(|entry| filter.map_or(true, |needle| entry.matches(needle)))
    }
}

impl<'a> IntoIterator for &'a HistoryView {
    type Item = &'a HistoryEntry;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
