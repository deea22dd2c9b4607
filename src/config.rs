//! Configuration management for Chatboard
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatboardError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure for Chatboard
///
/// Holds the settings of both applications plus the listen addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat app settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Board app settings
    #[serde(default)]
    pub board: BoardConfig,
    /// HTTP listen settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Chat app configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Gemini model to talk to
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL of the Gemini REST API
    ///
    /// Overridable so tests and local mocks can point the provider at a
    /// mock server.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key; the `GOOGLE_API_KEY` environment variable takes precedence
    #[serde(default)]
    pub api_key: Option<String>,

    /// Check at startup that the configured model is listed by the API
    #[serde(default = "default_verify_model")]
    pub verify_model: bool,

    /// Timeout for a single remote call (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Idle time after which a browser session is discarded (seconds)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,

    /// Page heading
    #[serde(default = "default_chat_title")]
    pub title: String,

    /// Text shown under the heading
    #[serde(default = "default_chat_description")]
    pub description: String,
}

// Manual impl so the key never ends up in logs.
impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("verify_model", &self.verify_model)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("title", &self.title)
            .field("description", &self.description)
            .finish()
    }
}

fn default_chat_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_verify_model() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    120
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_chat_title() -> String {
    "Chatbot".to_string()
}

fn default_chat_description() -> String {
    "A basic chatbot built on the Gemini API.".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            api_base: default_api_base(),
            api_key: None,
            verify_model: default_verify_model(),
            request_timeout_seconds: default_request_timeout(),
            session_ttl_seconds: default_session_ttl(),
            title: default_chat_title(),
            description: default_chat_description(),
        }
    }
}

/// Board app configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// SQLite file; `None` means the platform data directory
    #[serde(default)]
    pub db_path: Option<String>,

    /// Page heading
    #[serde(default = "default_board_title")]
    pub title: String,
}

fn default_board_title() -> String {
    "Bulletin Board".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            title: default_board_title(),
        }
    }
}

/// HTTP listen configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address of the chat app
    #[serde(default = "default_chat_bind")]
    pub chat_bind: String,

    /// Listen address of the board app
    #[serde(default = "default_board_bind")]
    pub board_bind: String,
}

fn default_chat_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_board_bind() -> String {
    "127.0.0.1:8502".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            chat_bind: default_chat_bind(),
            board_bind: default_board_bind(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatboardError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatboardError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(model) = std::env::var("CHATBOARD_CHAT_MODEL") {
            self.chat.model = model;
        }

        if let Ok(api_base) = std::env::var("CHATBOARD_CHAT_API_BASE") {
            self.chat.api_base = api_base;
        }

        if let Ok(ttl) = std::env::var("CHATBOARD_SESSION_TTL_SECONDS") {
            match ttl.parse::<u64>() {
                Ok(v) => self.chat.session_ttl_seconds = v,
                Err(_) => tracing::warn!(
                    "Ignoring CHATBOARD_SESSION_TTL_SECONDS={}: not a number",
                    ttl
                ),
            }
        }

        if let Ok(bind) = std::env::var("CHATBOARD_CHAT_BIND") {
            self.server.chat_bind = bind;
        }

        if let Ok(bind) = std::env::var("CHATBOARD_BOARD_BIND") {
            self.server.board_bind = bind;
        }

        if let Ok(db) = std::env::var("CHATBOARD_BOARD_DB") {
            self.board.db_path = Some(db);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        use crate::cli::{Commands, PostsArgs};

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            Commands::Chat { bind: Some(bind) } => {
                self.server.chat_bind = bind.clone();
            }
            Commands::Board { bind, db } => {
                if let Some(bind) = bind {
                    self.server.board_bind = bind.clone();
                }
                if let Some(db) = db {
                    self.board.db_path = Some(db.clone());
                }
            }
            Commands::Posts(PostsArgs { db: Some(db), .. }) => {
                self.board.db_path = Some(db.clone());
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.chat.model.trim().is_empty() {
            return Err(ChatboardError::Config("chat.model cannot be empty".to_string()).into());
        }

        match url::Url::parse(&self.chat.api_base) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => {
                return Err(ChatboardError::Config(format!(
                    "chat.api_base must be an http(s) URL, got: {}",
                    self.chat.api_base
                ))
                .into());
            }
        }

        if self.chat.request_timeout_seconds == 0 {
            return Err(ChatboardError::Config(
                "chat.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.session_ttl_seconds == 0 {
            return Err(ChatboardError::Config(
                "chat.session_ttl_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        for (name, addr) in [
            ("server.chat_bind", &self.server.chat_bind),
            ("server.board_bind", &self.server.board_bind),
        ] {
            if addr.parse::<SocketAddr>().is_err() {
                return Err(ChatboardError::Config(format!(
                    "{} is not a valid socket address: {}",
                    name, addr
                ))
                .into());
            }
        }

        Ok(())
    }
}
