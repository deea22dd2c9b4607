use crate::board::BoardStore;
use crate::cli::PostsCommand;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle posts commands
pub fn handle_posts(config: &Config, command: PostsCommand) -> Result<()> {
    let store = BoardStore::open(&config.board)?;

    match command {
        PostsCommand::List => {
            let posts = store.list_posts()?;

            if posts.is_empty() {
                println!("{}", "No posts found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Author".bold(),
                "Created".bold()
            ]);

            for post in posts {
                table.add_row(prettytable::row![
                    post.id.to_string().cyan(),
                    truncate(&post.title, 40),
                    post.author,
                    post.created_at
                ]);
            }

            println!("\nPosts in {}:", store.db_path().display());
            table.printstd();
            println!();
        }
        PostsCommand::Delete { id } => {
            if store.delete_post(id)? {
                println!("{}", format!("Deleted post {}", id).green());
            } else {
                println!("{}", format!("No post with id {}", id).yellow());
            }
        }
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
