use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, info};
use sqlx::{
  sqlite::{SqliteConnectOptions, SqliteRow},
  ConnectOptions, Connection, Row, SqliteConnection,
};
use tokio::sync::Mutex;

use super::Persistence;

pub async fn initialize_db(db_path: &str) -> anyhow::Result<SqliteConnection> {
  info!("acquiring sqlite connection for {}", db_path);
  let options = if db_path.starts_with("sqlite:") {
    SqliteConnectOptions::from_str(db_path)?
  } else {
    SqliteConnectOptions::new().filename(db_path)
  };
  let mut connection = options
    .create_if_missing(true)
    .connect()
    .await
    .with_context(|| format!("could not open sqlite database {}", db_path))?;
  sqlx::query(
    r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL
            )
            "#,
  )
  .execute(&mut connection)
  .await?;
  debug!("sqlite connection established");

  Ok(connection)
}

/// SQLite-backed key-value store. Each `save` runs in its own transaction.
pub struct PulseDb {
  connection: Mutex<SqliteConnection>,
}

impl PulseDb {
  pub async fn new(db_path: &str) -> anyhow::Result<Self> {
    Ok(PulseDb {
      connection: Mutex::new(initialize_db(db_path).await?),
    })
  }

  pub async fn in_memory() -> anyhow::Result<Self> {
    Self::new("sqlite::memory:").await
  }
}

#[async_trait]
impl Persistence for PulseDb {
  async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
    let mut connection = self.connection.lock().await;
    let row: Option<SqliteRow> = sqlx::query("SELECT value FROM kv WHERE key = $1")
      .bind(key)
      .fetch_optional(&mut *connection)
      .await?;
    match row {
      Some(row) => Ok(Some(row.try_get::<Vec<u8>, _>("value")?)),
      None => Ok(None),
    }
  }

  async fn save(&self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
    debug!("saving {} bytes under '{}'", bytes.len(), key);
    let mut connection = self.connection.lock().await;
    let mut transaction = connection.begin().await?;
    sqlx::query(
      r#"
            INSERT INTO kv (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
    )
    .bind(key)
    .bind(bytes)
    .execute(&mut *transaction)
    .await?;
    transaction.commit().await?;
    debug!("transaction committed");

    Ok(())
  }
}
