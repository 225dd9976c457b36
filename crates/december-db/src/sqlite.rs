use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use december_types::models::{Confession, ConfessionId};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::models::ConfessionRow;
use crate::{Result, StoreError, migrations};

/// Embedded store. Every call runs on the blocking pool; the single
/// connection is serialized behind a mutex, so `like` is atomic.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self::from_conn(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self::from_conn(conn))
    }

    fn from_conn(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("DB lock poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking join error: {}", e)))?
    }

    pub async fn list_all(&self) -> Result<Vec<Confession>> {
        let rows = self.with_conn(query_all).await?;
        rows.into_iter().map(Confession::try_from).collect()
    }

    pub async fn insert(&self, text: &str) -> Result<Confession> {
        let confession = Confession {
            id: ConfessionId::new(Uuid::new_v4().to_string()),
            text: text.to_string(),
            created_at: Utc::now(),
            likes: 0,
        };

        let row = confession.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, text, created_at, likes) VALUES (?1, ?2, ?3, 0)",
                (row.id.as_str(), &row.text, row.created_at.to_rfc3339()),
            )?;
            Ok(())
        })
        .await?;

        Ok(confession)
    }

    pub async fn like(&self, id: &ConfessionId) -> Result<u64> {
        let key = id.to_string();
        let likes: Option<i64> = self
            .with_conn(move |conn| {
                let likes = conn
                    .query_row(
                        "UPDATE messages SET likes = likes + 1 WHERE id = ?1 RETURNING likes",
                        [key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(likes)
            })
            .await?;

        let likes = likes.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        u64::try_from(likes).map_err(|_| StoreError::Corrupt(format!("likes {} on {}", likes, id)))
    }

    pub async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
        .await
    }
}

fn query_all(conn: &Connection) -> Result<Vec<ConfessionRow>> {
    let mut stmt = conn.prepare("SELECT id, text, created_at, likes FROM messages")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ConfessionRow {
                id: ConfessionId::new(row.get::<_, String>(0)?),
                text: row.get(1)?,
                created_at: row.get(2)?,
                likes: Some(row.get(3)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
