pub mod repository;

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

pub use repository::PulseDb;

pub const HISTORY_KEY: &str = "history";
pub const CREDENTIAL_KEY: &str = "api_key";

/// Durable key-value storage. A `save` either fully replaces the value for
/// `key` or leaves the previous one untouched.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn save(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Process-local storage, used by tests and by `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
