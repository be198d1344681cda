//! SQLite Document Store
//!
//! Embedded store for the backend using rusqlite with r2d2 connection pooling.
//! Two collections with the same document shape, `images` and `posts`, each
//! supporting insert, list, delete-by-url and find-by-id.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::models::{GeneratedImage, NewRecord, Post};
use crate::utils::error::{AppError, AppResult};

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Document collections held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Images,
    Posts,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Images => "images",
            Collection::Posts => "posts",
        }
    }
}

/// Listing order by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Raw document row from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: String,
    pub name: Option<String>,
    pub prompt: String,
    pub url: String,
    pub created_at: Option<String>,
}

impl RecordRow {
    fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn into_image(self) -> GeneratedImage {
        let created_at = self.created_at_utc();
        GeneratedImage {
            id: Some(self.id),
            name: self.name,
            prompt: self.prompt,
            url: self.url,
            created_at,
            persisted: true,
        }
    }

    pub fn into_post(self) -> Post {
        let created_at = self.created_at_utc();
        Post {
            id: Some(self.id),
            name: self.name,
            prompt: self.prompt,
            url: self.url,
            created_at,
        }
    }
}

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// The pool is capped at one connection because every in-memory
    /// connection is a separate database.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open (or create) a file-backed database with connection pooling
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Concurrent saves from one generation batch contend for the write lock
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        tracing::info!("database opened at {}", db_path.display());
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        for collection in [Collection::Images, Collection::Posts] {
            let table = collection.table();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        name TEXT,
                        prompt TEXT NOT NULL,
                        url TEXT NOT NULL,
                        created_at TEXT NOT NULL
                    )"
                ),
                [],
            )?;

            // Delete-by-url is the only non-key lookup
            conn.execute(
                &format!("CREATE INDEX IF NOT EXISTS idx_{table}_url ON {table}(url)"),
                [],
            )?;

            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at)"
                ),
                [],
            )?;
        }

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    // ========================================================================
    // Generic document operations
    // ========================================================================

    /// Insert a document after the required-field check
    pub fn insert_record(&self, collection: Collection, record: &NewRecord) -> AppResult<RecordRow> {
        record.validate().map_err(AppError::validation)?;

        let row = RecordRow {
            id: uuid::Uuid::new_v4().to_string(),
            name: record.normalized_name(),
            prompt: record.prompt.clone(),
            url: record.url.clone(),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        };

        let conn = self.get_connection()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, prompt, url, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                collection.table()
            ),
            params![row.id, row.name, row.prompt, row.url, row.created_at],
        )?;

        Ok(row)
    }

    /// List every document in a collection
    pub fn list_records(&self, collection: Collection, order: SortOrder) -> AppResult<Vec<RecordRow>> {
        let direction = match order {
            SortOrder::OldestFirst => "ASC",
            SortOrder::NewestFirst => "DESC",
        };

        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name, prompt, url, created_at FROM {}
             ORDER BY created_at {dir}, rowid {dir}",
            collection.table(),
            dir = direction
        ))?;

        let rows = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete every document whose url matches. Returns the number removed.
    pub fn delete_by_url(&self, collection: Collection, url: &str) -> AppResult<usize> {
        if url.trim().is_empty() {
            return Err(AppError::validation("url is required"));
        }
        let conn = self.get_connection()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE url = ?1", collection.table()),
            params![url],
        )?;
        Ok(deleted)
    }

    /// Find a document by key
    pub fn find_by_id(&self, collection: Collection, id: &str) -> AppResult<Option<RecordRow>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            &format!(
                "SELECT id, name, prompt, url, created_at FROM {} WHERE id = ?1",
                collection.table()
            ),
            params![id],
            Self::row_to_record,
        );

        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// Helper function to convert a database row to a RecordRow
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RecordRow> {
        Ok(RecordRow {
            id: row.get(0)?,
            name: row.get(1)?,
            prompt: row.get(2)?,
            url: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    // ========================================================================
    // Image Operations
    // ========================================================================

    pub fn insert_image(&self, record: &NewRecord) -> AppResult<GeneratedImage> {
        Ok(self.insert_record(Collection::Images, record)?.into_image())
    }

    /// All images, newest first
    pub fn list_images(&self) -> AppResult<Vec<GeneratedImage>> {
        Ok(self
            .list_records(Collection::Images, SortOrder::NewestFirst)?
            .into_iter()
            .map(RecordRow::into_image)
            .collect())
    }

    pub fn delete_images_by_url(&self, url: &str) -> AppResult<usize> {
        self.delete_by_url(Collection::Images, url)
    }

    pub fn find_image(&self, id: &str) -> AppResult<Option<GeneratedImage>> {
        Ok(self
            .find_by_id(Collection::Images, id)?
            .map(RecordRow::into_image))
    }

    // ========================================================================
    // Post Operations
    // ========================================================================

    pub fn insert_post(&self, record: &NewRecord) -> AppResult<Post> {
        Ok(self.insert_record(Collection::Posts, record)?.into_post())
    }

    /// All posts in insertion order; the feed reverses them for display
    pub fn list_posts(&self) -> AppResult<Vec<Post>> {
        Ok(self
            .list_records(Collection::Posts, SortOrder::OldestFirst)?
            .into_iter()
            .map(RecordRow::into_post)
            .collect())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}
