//! Hike persistence
//!
//! SQLite-backed store for confirmed hike records. This is the commit
//! collaborator the intake flow hands finished drafts to.

use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// SQL schema for initialization.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS hikes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    is_published BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hikes_starts ON hikes(starts_at);
CREATE INDEX IF NOT EXISTS idx_hikes_created ON hikes(created_at DESC);
"#;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("hike not found: {0}")]
    HikeNotFound(i64),
}

pub type DbResult<T> = Result<T, DbError>;

/// A persisted hike record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hike {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    pub is_published: bool,
    pub created_at: DateTime<FixedOffset>,
}

/// Fields for a hike about to be created.
#[derive(Debug, Clone)]
pub struct NewHike {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
}

/// Thread-safe database handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert a new hike; drafts start unpublished.
    pub fn create_hike(&self, new: &NewHike) -> DbResult<Hike> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().fixed_offset();
        conn.execute(
            "INSERT INTO hikes (title, description, starts_at, ends_at, is_published, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                new.title,
                new.description,
                new.starts_at.to_rfc3339(),
                new.ends_at.to_rfc3339(),
                created_at.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(hike_id = id, title = %new.title, "hike created");
        Ok(Hike {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            is_published: false,
            created_at,
        })
    }

    /// Fetch one hike by id.
    pub fn get_hike(&self, id: i64) -> DbResult<Hike> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, starts_at, ends_at, is_published, created_at
             FROM hikes WHERE id = ?1",
        )?;
        stmt.query_row(params![id], hike_from_row).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::HikeNotFound(id),
            other => DbError::Sqlite(other),
        })
    }

    /// Most recently created hikes, newest first.
    pub fn list_hikes(&self, limit: u32) -> DbResult<Vec<Hike>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, starts_at, ends_at, is_published, created_at
             FROM hikes ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], hike_from_row)?;
        let mut hikes = Vec::new();
        for row in rows {
            hikes.push(row?);
        }
        Ok(hikes)
    }

    /// Flip the published flag.
    pub fn set_published(&self, id: i64, published: bool) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE hikes SET is_published = ?1 WHERE id = ?2",
            params![published, id],
        )?;
        if changed == 0 {
            return Err(DbError::HikeNotFound(id));
        }
        Ok(())
    }
}

fn hike_from_row(row: &Row<'_>) -> rusqlite::Result<Hike> {
    Ok(Hike {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        starts_at: stamp_from_column(row, 3)?,
        ends_at: stamp_from_column(row, 4)?,
        is_published: row.get(5)?,
        created_at: stamp_from_column(row, 6)?,
    })
}

fn stamp_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<FixedOffset>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
