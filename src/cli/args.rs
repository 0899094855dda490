//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Live path index with subsequence queries
#[derive(Parser, Debug)]
#[command(
    name = "treefind",
    version = env!("CARGO_PKG_VERSION"),
    about = "Live path index with subsequence queries over a Unix socket",
    long_about = "Watch a directory tree, keep every path under it in memory, \
                  and answer subsequence-match queries over a Unix domain socket.",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up .treefind directory with default configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Index a directory tree and answer queries until interrupted
    #[command(after_help = "Examples:\n  treefind serve\n  treefind serve --dir ~/src --socket /tmp/src.sock")]
    Serve {
        /// Directory to be monitored (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Query socket path (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,
    },

    /// Print indexed paths containing PATTERN as an ordered subsequence
    #[command(after_help = "Examples:\n  treefind query main.rs\n  treefind query ''        # every indexed path\n  treefind query srcmod --json")]
    Query {
        /// Characters to match, in order, case-sensitive
        #[arg(default_value = "")]
        pattern: String,

        /// Query socket path (overrides config)
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// Print results as a JSON array
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from([
            "treefind", "serve", "--dir", "/srv", "--socket", "/tmp/t.sock",
        ]);
        match cli.command {
            Commands::Serve { dir, socket } => {
                assert_eq!(dir, Some(PathBuf::from("/srv")));
                assert_eq!(socket, Some(PathBuf::from("/tmp/t.sock")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_query_pattern_defaults_to_empty() {
        let cli = Cli::parse_from(["treefind", "query", "--json"]);
        match cli.command {
            Commands::Query { pattern, json, .. } => {
                assert_eq!(pattern, "");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["treefind", "config", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
