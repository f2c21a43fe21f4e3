pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Credentials;

#[derive(Parser)]
#[command(name = "runnel")]
#[command(about = "Fetch RSS/Atom feeds and keep track of what is new", long_about = None)]
pub struct Cli {
    /// State file holding feeds and seen items
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Configuration file (default: ~/.config/runnel/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers, overriding the configuration
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How to reach a feed.
#[derive(Args, Debug, Clone, Default)]
pub struct Access {
    /// Username for HTTP basic authentication
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Password for HTTP basic authentication
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// Accept certificates from unknown authorities
    #[arg(long)]
    pub insecure: bool,
}

impl Access {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new feed
    Add {
        /// URL of the feed to add
        url: String,

        /// Name shown instead of the feed's own title
        #[arg(short, long)]
        nickname: Option<String>,

        #[command(flatten)]
        access: Access,
    },
    /// Remove a feed
    Remove {
        /// URL of the feed to remove
        url: String,
    },
    /// Update all feeds
    Update {
        /// Print every item of each feed's current document instead of
        /// merging new items into the history
        #[arg(long)]
        new: bool,
    },
    /// List feeds or items
    List {
        /// Show items instead of feeds
        #[arg(long)]
        items: bool,
    },
    /// Fetch a feed once and print it without subscribing
    Fetch {
        url: String,

        #[command(flatten)]
        access: Access,
    },
    /// Parse a local feed document and print it
    Parse {
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_credentials() {
        let cli = Cli::try_parse_from([
            "runnel",
            "--state",
            "/tmp/s.json",
            "add",
            "https://example.com/feed",
            "-u",
            "user",
            "-p",
            "pass",
            "--insecure",
        ])
        .unwrap();

        assert_eq!(cli.state, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Add { url, access, nickname } => {
                assert_eq!(url, "https://example.com/feed");
                assert!(nickname.is_none());
                assert!(access.insecure);
                assert!(access.credentials().is_set());
            }
            _ => panic!("Expected Add"),
        }
    }

    #[test]
    fn test_parse_update_new() {
        let cli = Cli::try_parse_from(["runnel", "update", "--new", "-w", "4"]).unwrap();
        assert_eq!(cli.workers, Some(4));
        assert!(matches!(cli.command, Commands::Update { new: true }));
    }
}
