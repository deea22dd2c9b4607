use crate::board::{now_timestamp, Post, PostForm};
use crate::config::BoardConfig;
use crate::error::{ChatboardError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Storage backend for board posts
///
/// Holds one connection for the lifetime of the store. Every operation
/// acquires it for its own scope; the guard releases it on drop.
pub struct BoardStore {
    db_path: PathBuf,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl BoardStore {
    /// Create a store in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "chatboard", "chatboard")
            .ok_or_else(|| ChatboardError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("board.db"))
    }

    /// Create a store backed by the given database file.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatboard::board::BoardStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = BoardStore::new_with_path(dir.path().join("board.db")).unwrap();
    /// assert!(store.list_posts().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;
            }
        }

        let conn = Connection::open(&db_path)
            .context("Failed to open database")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        conn.busy_timeout(Duration::from_secs(5))
            .context("Failed to set busy timeout")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        let store = Self {
            db_path,
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;

        tracing::info!("Opened board database at {}", store.db_path.display());
        Ok(store)
    }

    /// Open the store named by the board configuration
    pub fn open(config: &BoardConfig) -> Result<Self> {
        match &config.db_path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ChatboardError::Storage("Database connection lock poisoned".into()).into())
    }

    /// Create the posts table if it does not exist
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        Ok(())
    }

    /// All posts, newest first
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        let conn = self.connection()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, content, author, created_at
                FROM posts
                ORDER BY created_at DESC, id DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        let posts = stmt
            .query_map([], post_from_row)
            .context("Failed to query posts")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read post row")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        Ok(posts)
    }

    /// Load one post by id
    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let conn = self.connection()?;
        fetch_post(&conn, id)
    }

    /// Number of stored posts
    pub fn count_posts(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .context("Failed to count posts")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;
        Ok(count as usize)
    }

    /// Validate and insert a new post stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns a validation error (nothing is stored) if a field is empty
    pub fn create_post(&self, form: &PostForm) -> Result<Post> {
        form.validate()?;
        let form = form.normalized();
        let created_at = now_timestamp();

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO posts (title, content, author, created_at) VALUES (?, ?, ?, ?)",
            params![form.title, form.content, form.author, created_at],
        )
        .context("Failed to insert post")
        .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        let id = conn.last_insert_rowid();
        tracing::info!(post_id = id, "Created post");

        Ok(Post {
            id,
            title: form.title,
            content: form.content,
            author: form.author,
            created_at,
        })
    }

    /// Validate and overwrite the text fields of an existing post
    ///
    /// `id` and `created_at` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a field is empty, or
    /// `ChatboardError::NotFound` if no post has this id
    pub fn update_post(&self, id: i64, form: &PostForm) -> Result<Post> {
        form.validate()?;
        let form = form.normalized();

        let conn = self.connection()?;
        let changed = conn
            .execute(
                "UPDATE posts SET title = ?, content = ?, author = ? WHERE id = ?",
                params![form.title, form.content, form.author, id],
            )
            .context("Failed to update post")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        if changed == 0 {
            return Err(ChatboardError::NotFound(format!("post {}", id)).into());
        }

        tracing::info!(post_id = id, "Updated post");
        fetch_post(&conn, id)?
            .ok_or_else(|| ChatboardError::NotFound(format!("post {}", id)).into())
    }

    /// Delete a post; returns whether a row existed
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        let conn = self.connection()?;
        let deleted = conn
            .execute("DELETE FROM posts WHERE id = ?", params![id])
            .context("Failed to delete post")
            .map_err(|e| ChatboardError::Storage(format!("{:#}", e)))?;

        tracing::info!(post_id = id, deleted, "Deleted post");
        Ok(deleted > 0)
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn fetch_post(conn: &Connection, id: i64) -> Result<Option<Post>> {
    conn.query_row(
        "SELECT id, title, content, author, created_at FROM posts WHERE id = ?",
        params![id],
        post_from_row,
    )
    .optional()
    .context("Failed to query post")
    .map_err(|e| ChatboardError::Storage(format!("{:#}", e)).into())
}
