//! Bulletin board domain types
//!
//! A post is created from the write form, listed newest first, edited in
//! place and deleted by id. All three text fields must be non-empty.

use crate::error::{ChatboardError, Result};
use serde::{Deserialize, Serialize};

pub mod store;
pub use store::BoardStore;

/// Timestamp format of `posts.created_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Row id, assigned by SQLite
    pub id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Author name
    pub author: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS` in server local time
    pub created_at: String,
}

impl Post {
    /// Human-readable label, for display only
    ///
    /// # Examples
    ///
    /// ```
    /// use chatboard::board::Post;
    ///
    /// let post = Post {
    ///     id: 1,
    ///     title: "Hello".into(),
    ///     content: "World".into(),
    ///     author: "Sam".into(),
    ///     created_at: "2024-05-01 10:00:00".into(),
    /// };
    /// assert_eq!(post.label(), "Hello - Sam (2024-05-01 10:00:00)");
    /// ```
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.title, self.author, self.created_at)
    }
}

/// Submitted write/edit form
///
/// Missing fields deserialize as empty strings so they fail validation
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    /// Post title
    #[serde(default)]
    pub title: String,
    /// Post body
    #[serde(default)]
    pub content: String,
    /// Author name
    #[serde(default)]
    pub author: String,
}

impl PostForm {
    /// Build a form from its three fields
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: author.into(),
        }
    }

    /// Check that every field is filled in
    ///
    /// # Errors
    ///
    /// Returns `ChatboardError::Validation` naming each empty field
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("content", &self.content),
            ("author", &self.author),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ChatboardError::Validation(format!(
                "Please fill in all fields (missing: {})",
                missing.join(", ")
            ))
            .into())
        }
    }

    /// Title and author trimmed, content kept as typed
    pub(crate) fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.clone(),
            author: self.author.trim().to_string(),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self::new(&post.title, &post.content, &post.author)
    }
}

/// Current server-local time in the storage format
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
