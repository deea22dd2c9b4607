//! Chatboard - a Gemini chat page and a SQLite bulletin board
//!
//! This library provides the two small web applications served by the
//! `chatboard` binary, plus the pieces they share.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: Chat app startup, sessions, and per-session history
//! - `providers`: Model provider abstraction and the Gemini implementation
//! - `board`: Post model and the SQLite post store
//! - `web`: axum routers and HTML rendering for both apps
//! - `credentials`: API key resolution and keyring storage
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Command handlers invoked by the binary
//!
//! # Example
//!
//! ```no_run
//! use chatboard::{BoardStore, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = BoardStore::open(&config.board)?;
//!     for post in store.list_posts()? {
//!         println!("{}", post.label());
//!     }
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod providers;
pub mod web;

// Re-export commonly used types
pub use board::{BoardStore, Post, PostForm};
pub use chat::ChatApp;
pub use config::Config;
pub use error::{ChatboardError, Result};
