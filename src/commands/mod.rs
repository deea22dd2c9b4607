/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: serve the chat app
- `board`: serve the bulletin board app
- `auth`: store the Gemini API key in the system keyring
- `posts`: list or delete board posts from the terminal
*/

use crate::config::Config;
use crate::error::{ChatboardError, Result};
use anyhow::Context;
use std::net::SocketAddr;

// Board posts terminal commands
pub mod posts;

/// Bind `addr` and serve `router` until Ctrl-C
pub async fn serve(router: axum::Router, addr: &str, app_name: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ChatboardError::Config(format!("Invalid listen address {}: {}", addr, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ChatboardError::Io)
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "{} app listening on http://{}",
        app_name,
        listener.local_addr().map_err(ChatboardError::Io)?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("{} app stopped", app_name);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

// Chat command handler
pub mod chat {
    //! Chat app server.
    //!
    //! Runs startup (credential, model check) once, then serves the chat
    //! page. A failed startup still serves, showing only the error page.

    use super::*;
    use crate::chat::ChatApp;

    /// Start the chat app
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        let app = ChatApp::initialize(&config.chat).await;
        if let ChatApp::Unavailable(failure) = &app {
            tracing::error!(
                "Chat app is unavailable: {}",
                failure.user_message()
            );
        }

        let router = crate::web::chat::router(app, &config.chat);
        serve(router, &config.server.chat_bind, "Chat").await
    }
}

// Board command handler
pub mod board {
    //! Bulletin board server.

    use super::*;
    use crate::board::BoardStore;
    use std::sync::Arc;

    /// Open the database, make sure the table exists, and serve the board
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_board(config: Config) -> Result<()> {
        let store = BoardStore::open(&config.board)?;
        let router = crate::web::board::router(Arc::new(store), config.board.title.clone());
        serve(router, &config.server.board_bind, "Board").await
    }
}

pub mod auth {
    use super::*;
    use crate::credentials::{store_api_key, API_KEY_ENV};
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Prompt for the Gemini API key and store it in the system keyring
    pub fn authenticate() -> Result<()> {
        if std::env::var(API_KEY_ENV).is_ok() {
            println!(
                "{}",
                format!(
                    "Note: {} is set and takes precedence over the keyring.",
                    API_KEY_ENV
                )
                .yellow()
            );
        }

        let mut editor = DefaultEditor::new()?;
        let key = editor.readline("Gemini API key: ")?;
        store_api_key(&key)?;

        println!("{}", "API key stored in the system keyring.".green());
        Ok(())
    }
}
