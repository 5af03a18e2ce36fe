//! Durable conversation memories.
//!
//! Every memory is written as a JSON snapshot under `<data_dir>/memories/`,
//! and indexed in a small SQLite catalog (`<data_dir>/memories.db`) that
//! backs listing, resuming and deletion. The store holds no reference to
//! the active memory between calls; the session owns it.

use crate::error::{Result, ScoutError};
use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const CATALOG_DB_NAME: &str = "memories.db";
const SNAPSHOT_DIR_NAME: &str = "memories";
const TITLE_DISPLAY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
}

impl Interaction {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            sources,
        }
    }
}

/// Where a memory sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryState {
    Empty,
    ActiveUnsaved,
    ActiveSaved,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Option<String>,
    pub title: String,
    pub interactions: Vec<Interaction>,
    #[serde(skip)]
    saved: bool,
}

impl Memory {
    /// Append an interaction. The first one names the memory and, when no id
    /// exists yet, gives it a fresh identity.
    pub fn append(&mut self, interaction: Interaction) {
        if self.interactions.is_empty() {
            if self.title.is_empty() {
                self.title = interaction.question.clone();
            }
            if self.id.is_none() {
                self.id = Some(uuid::Uuid::new_v4().to_string());
            }
        }
        self.interactions.push(interaction);
        self.saved = false;
    }

    pub fn state(&self) -> MemoryState {
        if self.interactions.is_empty() {
            MemoryState::Empty
        } else if self.saved {
            MemoryState::ActiveSaved
        } else {
            MemoryState::ActiveUnsaved
        }
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Prior turns rendered for inclusion in a model prompt.
    pub fn history_for_model(&self) -> String {
        let mut history = String::new();
        for interaction in &self.interactions {
            history.push_str(&format!(
                "User: {}\nModel: {}\n\n",
                interaction.question, interaction.answer
            ));
        }
        history
    }

    /// Human readable transcript shown when a memory is resumed.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for interaction in &self.interactions {
            out.push_str(&format!(">>>> {}\n\n", interaction.question));
            out.push_str(&format!("{}\n\n", interaction.answer));
            if !interaction.sources.is_empty() {
                out.push_str(&format!("Links:\n{}\n\n", interaction.sources.join("\n")));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    /// Unix seconds of the last persist.
    pub updated: i64,
}

impl CatalogEntry {
    /// Title with newlines escaped, cut to at most 100 characters.
    pub fn display_title(&self) -> String {
        self.title
            .replace('\n', "\\n")
            .chars()
            .take(TITLE_DISPLAY_LIMIT)
            .collect()
    }

    pub fn updated_local(&self) -> String {
        match Local.timestamp_opt(self.updated, 0).single() {
            Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.updated.to_string(),
        }
    }
}

pub struct MemoryStore {
    pool: SqlitePool,
    snapshot_dir: PathBuf,
}

impl MemoryStore {
    /// Open (or create) the catalog and snapshot directory under `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let snapshot_dir = data_dir.join(SNAPSHOT_DIR_NAME);
        tokio::fs::create_dir_all(&snapshot_dir)
            .await
            .map_err(|e| ScoutError::storage("open", e))?;

        let options = SqliteConnectOptions::new()
            .filename(data_dir.join(CATALOG_DB_NAME))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| ScoutError::storage("open", e))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS memories (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                updated INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| ScoutError::storage("open", e))?;

        info!("Memory store opened at {:?}", data_dir);
        Ok(Self { pool, snapshot_dir })
    }

    fn snapshot_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(ScoutError::Storage {
                operation: "resolve",
                detail: format!("invalid memory id {:?}", id),
            });
        }
        Ok(self.snapshot_dir.join(format!("{}.json", id)))
    }

    /// Write the memory and stamp it in the catalog with the current time.
    pub async fn persist(&self, memory: &mut Memory) -> Result<()> {
        self.persist_at(memory, Utc::now().timestamp()).await
    }

    /// Write the memory and stamp it in the catalog with `updated`.
    /// A memory without interactions is left alone.
    pub async fn persist_at(&self, memory: &mut Memory, updated: i64) -> Result<()> {
        if memory.interactions.is_empty() {
            return Ok(());
        }
        let id = memory
            .id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone();
        debug!(memory_id = %id, "Saving current memory");

        let path = self.snapshot_path(&id)?;
        let encoded =
            serde_json::to_vec_pretty(memory).map_err(|e| ScoutError::storage("persist", e))?;

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, &encoded)
            .await
            .map_err(|e| ScoutError::storage("persist", e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| ScoutError::storage("persist", e))?;

        sqlx::query(
            "INSERT INTO memories (id, title, updated)
             VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET updated = excluded.updated",
        )
        .bind(&id)
        .bind(&memory.title)
        .bind(updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(memory_id = %id, "Failed to upsert catalog row: {}", e);
            ScoutError::storage("persist", e)
        })?;

        memory.saved = true;
        Ok(())
    }

    pub async fn load(&self, id: &str) -> Result<Memory> {
        debug!(memory_id = %id, "Loading memory");
        let path = self.snapshot_path(id)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ScoutError::storage("load", e))?;
        let mut memory: Memory = serde_json::from_slice(&bytes).map_err(|e| {
            error!(memory_id = %id, "Memory snapshot is corrupt: {}", e);
            ScoutError::storage("load", e)
        })?;
        memory.saved = true;
        Ok(memory)
    }

    /// Remove both the catalog row and the snapshot. Both removals are
    /// attempted; a failure of either is reported with the half it hit.
    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!(memory_id = %id, "Deleting memory");
        let path = self.snapshot_path(id)?;

        let catalog = match sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) if result.rows_affected() == 0 => Some("no catalog row".to_string()),
            Ok(_) => None,
            Err(e) => Some(e.to_string()),
        };

        let snapshot = tokio::fs::remove_file(&path).await.err().map(|e| e.to_string());

        if catalog.is_none() && snapshot.is_none() {
            return Ok(());
        }
        error!(memory_id = %id, ?catalog, ?snapshot, "Memory delete incomplete");
        Err(ScoutError::PartialDelete {
            id: id.to_string(),
            catalog,
            snapshot,
        })
    }

    /// Catalog entries, oldest first.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>> {
        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT id, title, updated FROM memories ORDER BY updated ASC, id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ScoutError::storage("list", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, title, updated)| CatalogEntry { id, title, updated })
            .collect())
    }

    /// Load the most recently persisted memory.
    pub async fn resume_last(&self) -> Result<Memory> {
        debug!("Resuming last memory");
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM memories ORDER BY updated DESC, id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ScoutError::storage("resume", e))?;

        match row {
            Some((id,)) => self.load(&id).await,
            None => Err(ScoutError::Storage {
                operation: "resume",
                detail: "no memories have been saved yet".to_string(),
            }),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
