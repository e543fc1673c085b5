//! Browse command implementation.

use anyhow::{Context, Result};

use godrop_core::backend::local::LocalFilesystem;
use godrop_core::navigator::{parent_path, PathNavigator};

use super::BrowseArgs;

/// Run the browse command.
pub async fn run(args: BrowseArgs) -> Result<()> {
    let config = super::load_config();
    let lister = LocalFilesystem::new().with_hidden(args.hidden);

    let start = match args.path {
        Some(path) => path,
        None => match config.browser.start_dir {
            Some(dir) => dir.to_string_lossy().into_owned(),
            None => lister.home_directory()?,
        },
    };
    let path = if args.up { parent_path(&start) } else { start };

    let mut navigator = PathNavigator::new();
    navigator
        .load_directory(&lister, &path)
        .await
        .with_context(|| format!("Failed to list {path}"))?;

    if args.json {
        let output = serde_json::json!({
            "path": navigator.current_path(),
            "entries": navigator.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {}", navigator.current_path());
    println!("  {}", "-".repeat(40));
    if navigator.entries().is_empty() {
        println!("  (empty)");
    }
    for entry in navigator.entries() {
        if entry.is_directory() {
            println!("  [DIR] {}", entry.name);
        } else {
            println!("        {:<40} {:>10}", entry.name, entry.display_size());
        }
    }
    println!();

    Ok(())
}
