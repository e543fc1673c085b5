//! CLI command definitions and handlers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Load configuration with graceful fallback to defaults.
///
/// A missing or unreadable config file is not an error for any command
/// except `config` itself.
pub fn load_config() -> godrop_core::config::Config {
    godrop_core::config::Config::load().unwrap_or_default()
}

pub mod browse;
pub mod clipboard;
pub mod config;
pub mod view;

/// Godrop - ad-hoc local network file sharing
#[derive(Parser)]
#[command(name = "godrop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// List a directory the way the file picker shows it
    Browse(BrowseArgs),

    /// Open a broadcast link as a detached viewer and download the file
    View(ViewArgs),

    /// Read, write or watch the system clipboard
    Clipboard(ClipboardArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the browse command
#[derive(Parser)]
pub struct BrowseArgs {
    /// Directory to list (defaults to the configured start directory or home)
    pub path: Option<String>,

    /// List the parent of the directory instead
    #[arg(long)]
    pub up: bool,

    /// Include dot-files
    #[arg(long)]
    pub hidden: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the view command
#[derive(Parser)]
pub struct ViewArgs {
    /// Link shared by the broadcasting device (e.g. http://192.168.1.20:1111)
    pub url: String,

    /// Security code, when the link asks for one
    #[arg(short, long, env = "GODROP_CODE")]
    pub code: Option<String>,

    /// Directory to save the download into (defaults to the configured dropzone)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep polling and show status changes instead of downloading
    #[arg(short, long)]
    pub watch: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the clipboard command
#[derive(Parser)]
pub struct ClipboardArgs {
    /// Clipboard subcommand
    #[command(subcommand)]
    pub action: ClipboardAction,
}

/// Clipboard subcommands
#[derive(Subcommand)]
pub enum ClipboardAction {
    /// Print the clipboard text
    Get,

    /// Replace the clipboard text
    Set {
        /// Text to put on the clipboard
        text: String,
    },

    /// Poll the clipboard and print every new entry of the history
    Watch,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show all configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_view() {
        let cli = Cli::parse_from(["godrop", "view", "http://10.0.0.2:1111", "--code", "42"]);
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        assert_eq!(args.url, "http://10.0.0.2:1111");
        assert_eq!(args.code.as_deref(), Some("42"));
        assert!(!args.watch);
    }
}
