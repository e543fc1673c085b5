//! View command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use godrop_core::viewer::runner::now_epoch;
use godrop_core::viewer::{
    download_path, run_viewer, HttpViewerApi, SecurityGate, ViewerDisplay,
    FALLBACK_DOWNLOAD_NAME,
};
use godrop_core::Error;

use super::ViewArgs;

/// Run the view command.
pub async fn run(args: ViewArgs) -> Result<()> {
    let config = super::load_config();
    let api = HttpViewerApi::new(&args.url);
    let mut gate = SecurityGate::new(api);

    if args.watch {
        return watch_link(gate, &args, &config.viewer).await;
    }

    if let Err(e) = gate.refresh(now_epoch()).await {
        print_block(&gate.display(), args.json)?;
        bail!("{} is not reachable: {}", args.url, e);
    }

    if gate.code_prompt_visible() {
        let Some(code) = args.code.as_deref() else {
            print_block(&gate.display(), args.json)?;
            bail!("This link needs a security code. Pass it with --code.");
        };
        match gate.verify(code).await {
            Ok(()) => {}
            Err(Error::VerificationFailed) => {
                print_block(&gate.display(), args.json)?;
                bail!("Security code rejected.");
            }
            Err(e) => return Err(e.into()),
        }
    }

    print_block(&gate.display(), args.json)?;
    gate.ensure_download_allowed()?;

    let advertised = gate
        .stats()
        .map_or(FALLBACK_DOWNLOAD_NAME, |s| s.file_name.as_str());
    let dir = args
        .output
        .clone()
        .or(config.session.save_location.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let dest = download_path(&dir, advertised);

    let written = gate.api().download_to(&dest).await?;
    if !args.json {
        println!("  Saved {} ({} bytes)", dest.display(), written);
        println!();
    }
    Ok(())
}

async fn watch_link(
    gate: SecurityGate<HttpViewerApi>,
    args: &ViewArgs,
    config: &godrop_core::config::ViewerConfig,
) -> Result<()> {
    let (verify_tx, verify_rx) = mpsc::unbounded_channel();
    let (display_tx, mut display_rx) = watch::channel(ViewerDisplay::default());
    let cancel = CancellationToken::new();

    if let Some(code) = &args.code {
        verify_tx.send(code.clone())?;
    }

    let runner = tokio::spawn(run_viewer(
        gate,
        config.clone(),
        verify_rx,
        display_tx,
        cancel.clone(),
    ));

    let mut shown: Option<ViewerDisplay> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = display_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let display = display_rx.borrow_and_update().clone();
                let tick_only = shown
                    .as_ref()
                    .is_some_and(|prev| prev.only_countdown_differs(&display));
                if !tick_only {
                    print_display(&display, args.json)?;
                } else if !args.json {
                    print!("\r  Time left: {:<20}", display.time_left);
                    std::io::stdout().flush()?;
                }
                shown = Some(display);
            }
        }
    }
    if shown.is_some() && !args.json {
        println!();
    }

    cancel.cancel();
    let _ = runner.await;
    Ok(())
}

fn print_block(display: &ViewerDisplay, json: bool) -> Result<()> {
    print_display(display, json)?;
    if !json {
        println!();
    }
    Ok(())
}

/// Print `display`, leaving the cursor at the end of the time-left line so
/// the watch loop can redraw it in place.
fn print_display(display: &ViewerDisplay, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(display)?);
        return Ok(());
    }

    println!();
    println!();
    println!("  [{}] {}", display.badge, display.file_name);
    println!("  {}", "-".repeat(40));
    println!("  Size:      {}", display.file_size);
    match display.downloads_remaining {
        Some(left) => println!("  Downloads: {} of {} left", left, display.downloads_total),
        None => println!("  Downloads: unlimited"),
    }
    if display.show_code_prompt {
        println!("  Code:      {}", display.code_placeholder);
    }
    println!(
        "  Action:    {}{}",
        display.download_label,
        if display.download_enabled { "" } else { " (disabled)" }
    );
    print!("  Time left: {:<20}", display.time_left);
    std::io::stdout().flush()?;
    Ok(())
}
