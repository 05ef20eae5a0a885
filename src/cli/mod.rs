//! Command-line interface for the lost-and-found server.

mod commands;

pub use commands::{cmd_init, cmd_seed};

use clap::{Parser, Subcommand};

/// Gym lost-and-found portal API server
#[derive(Parser)]
#[command(name = "lostfound")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Overrides the configured port
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create the demo accounts when they are missing
    Seed,
}

impl Cli {
    /// Falls back to `serve` when no subcommand is given.
    #[must_use]
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::parse_from(["lostfound"]);
        assert_eq!(cli.command(), Commands::Serve { port: None });
    }

    #[test]
    fn serve_accepts_port() {
        let cli = Cli::parse_from(["lostfound", "serve", "--port", "8080"]);
        assert_eq!(cli.command(), Commands::Serve { port: Some(8080) });
    }

    #[test]
    fn seed_parses() {
        let cli = Cli::parse_from(["lostfound", "seed"]);
        assert_eq!(cli.command(), Commands::Seed);
    }
}
