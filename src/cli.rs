//! Command-line interface definition for Chatboard
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to serve either application, store the API key,
//! and inspect the board database.

use clap::{Args, Parser, Subcommand};

/// Chatboard - a Gemini chat page and a SQLite bulletin board
#[derive(Parser, Debug, Clone)]
#[command(name = "chatboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatboard
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the chat app
    Chat {
        /// Listen address (overrides server.chat_bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Serve the bulletin board app
    Board {
        /// Listen address (overrides server.board_bind)
        #[arg(short, long)]
        bind: Option<String>,

        /// SQLite database file (overrides board.db_path)
        #[arg(long, env = "CHATBOARD_BOARD_DB")]
        db: Option<String>,
    },

    /// Store the Gemini API key in the system keyring
    Auth,

    /// Inspect or edit board posts from the terminal
    Posts(PostsArgs),
}

/// Arguments of the `posts` command
#[derive(Args, Debug, Clone)]
pub struct PostsArgs {
    /// SQLite database file (overrides board.db_path)
    #[arg(long, env = "CHATBOARD_BOARD_DB")]
    pub db: Option<String>,

    /// Posts subcommand
    #[command(subcommand)]
    pub command: PostsCommand,
}

/// Posts management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PostsCommand {
    /// List all posts, newest first
    List,

    /// Delete a post by id
    Delete {
        /// Post id
        #[arg(short, long)]
        id: i64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Auth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["chatboard", "chat"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Chat { bind: None }));
    }

    #[test]
    fn test_cli_parse_chat_with_bind() {
        let cli = Cli::try_parse_from(["chatboard", "chat", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Commands::Chat { bind } = cli.command {
            assert_eq!(bind, Some("0.0.0.0:8080".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_board_with_db() {
        let cli = Cli::try_parse_from(["chatboard", "board", "--db", "posts.db"]).unwrap();
        if let Commands::Board { bind, db } = cli.command {
            assert!(bind.is_none());
            assert_eq!(db, Some("posts.db".to_string()));
        } else {
            panic!("Expected Board command");
        }
    }

    #[test]
    fn test_cli_parse_posts_list() {
        let cli = Cli::try_parse_from(["chatboard", "posts", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Posts(PostsArgs {
                command: PostsCommand::List,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_posts_delete_requires_id() {
        assert!(Cli::try_parse_from(["chatboard", "posts", "delete"]).is_err());

        let cli = Cli::try_parse_from(["chatboard", "posts", "delete", "--id", "3"]).unwrap();
        if let Commands::Posts(args) = cli.command {
            assert!(matches!(args.command, PostsCommand::Delete { id: 3 }));
        } else {
            panic!("Expected Posts command");
        }
    }

    #[test]
    fn test_cli_parse_with_config_and_verbose() {
        let cli =
            Cli::try_parse_from(["chatboard", "-v", "--config", "custom.yaml", "auth"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert!(matches!(cli.command, Commands::Auth));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["chatboard"]).is_err());
    }
}
