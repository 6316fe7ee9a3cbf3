use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use crate::db::{Persistence, CREDENTIAL_KEY};

/// Holds the AI credential and mirrors it into persistence.
pub struct CredentialStore {
    key: RwLock<Option<SecretString>>,
    persistence: Arc<dyn Persistence>,
}

impl CredentialStore {
    pub async fn load(persistence: Arc<dyn Persistence>) -> Self {
        let key = match persistence.load(CREDENTIAL_KEY).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(key) => non_empty(key),
                Err(_) => {
                    warn!("stored credential is not valid utf-8, ignoring it");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("could not load credential: {:#}", e);
                None
            }
        };
        Self {
            key: RwLock::new(key),
            persistence,
        }
    }

    /// Uses `key` for this session only, without writing it to storage.
    pub async fn set_transient(&self, key: String) {
        *self.key.write().await = non_empty(key);
    }

    /// Stores `key` durably. An empty key removes the credential.
    pub async fn set(&self, key: String) -> anyhow::Result<()> {
        let key = key.trim().to_string();
        self.persistence
            .save(CREDENTIAL_KEY, key.as_bytes())
            .await
            .context("could not persist credential")?;
        info!("credential updated");
        *self.key.write().await = non_empty(key);
        Ok(())
    }

    pub async fn is_configured(&self) -> bool {
        self.key.read().await.is_some()
    }

    /// The configured credential, or an empty secret when none is set.
    pub async fn current(&self) -> SecretString {
        match &*self.key.read().await {
            Some(key) => SecretString::from(key.expose_secret().to_string()),
            None => SecretString::from(String::new()),
        }
    }
}

fn non_empty(key: String) -> Option<SecretString> {
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(SecretString::from(key.to_string()))
    }
}
