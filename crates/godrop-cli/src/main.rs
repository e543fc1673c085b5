//! Godrop CLI - ad-hoc local network file sharing
//!
//! The command line side of Godrop: browse for files to share, open a
//! detached viewer on a link another device is broadcasting, and work with
//! the clipboard.
//!
//! ## Quick Start
//!
//! ```bash
//! # Pick files
//! godrop browse ~/Documents
//!
//! # Download from a device broadcasting on the LAN
//! godrop view http://192.168.1.20:1111 --code 4821
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;

mod commands;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Browse(args) => commands::browse::run(args).await,
        Command::View(args) => commands::view::run(args).await,
        Command::Clipboard(args) => commands::clipboard::run(args).await,
        Command::Config(args) => commands::config::run(args),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,godrop=info,godrop_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
