//! Status poll and countdown tick for the detached viewer.

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{SecurityGate, ViewerApi, ViewerDisplay};
use crate::config::ViewerConfig;

/// Drive `gate` until `cancel` fires, then hand it back.
///
/// The status poll runs every `stats_interval` (first poll immediately) and
/// the countdown every `tick_interval`. A failed poll only marks the gate
/// offline; both loops keep going. Codes sent on `verify_rx` are verified
/// one at a time. Every change is published on `display_tx`.
pub async fn run_viewer<A: ViewerApi>(
    mut gate: SecurityGate<A>,
    config: ViewerConfig,
    mut verify_rx: mpsc::UnboundedReceiver<String>,
    display_tx: watch::Sender<ViewerDisplay>,
    cancel: CancellationToken,
) -> SecurityGate<A> {
    let mut stats_timer = interval(config.stats_interval);
    stats_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick_timer = interval(config.tick_interval);
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = stats_timer.tick() => {
                if let Err(e) = gate.refresh(now_epoch()).await {
                    tracing::debug!(error = %e, "Status poll failed");
                }
            }
            _ = tick_timer.tick() => {
                gate.tick(now_epoch());
            }
            Some(code) = verify_rx.recv() => {
                gate.set_code_input(code.clone());
                if let Err(e) = gate.verify(&code).await {
                    tracing::debug!(error = %e, "Verification did not unlock");
                }
            }
        }
        display_tx.send_if_modified(|current| {
            let next = gate.display();
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    tracing::debug!("Viewer stopped");
    gate
}

/// Current Unix time in seconds.
pub fn now_epoch() -> i64 {
    Utc::now().timestamp()
}
