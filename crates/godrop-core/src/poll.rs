//! Cancellable periodic tasks.
//!
//! A [`PeriodicTask`] runs a job on a fixed period in a background tokio task
//! and forwards every produced value into an mpsc channel. The task stops when
//! its handle is cancelled or dropped, or when the receiving side goes away.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running periodic job.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn `job` every `period`, the first run one period from now.
    ///
    /// `None` results are skipped. A run that completes after cancellation is
    /// discarded instead of sent.
    pub fn spawn<T, F, Fut>(
        name: &'static str,
        period: Duration,
        tx: mpsc::UnboundedSender<T>,
        mut job: F,
    ) -> Self
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            tracing::debug!(task = name, ?period, "Periodic task armed");
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(period) => {}
                }

                let value = tokio::select! {
                    () = token.cancelled() => break,
                    value = job() => value,
                };

                if let Some(value) = value {
                    if token.is_cancelled() || tx.send(value).is_err() {
                        break;
                    }
                }
            }
            tracing::debug!(task = name, "Periodic task stopped");
        });

        Self {
            name,
            cancel_token,
            handle,
        }
    }

    /// Name given at spawn time.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the task. Idempotent.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Whether the task has neither been cancelled nor exited.
    pub fn is_active(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_runs_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);

        let task = PeriodicTask::spawn("count", Duration::from_secs(2), tx, move || {
            let c = Arc::clone(&c);
            async move { Some(c.fetch_add(1, Ordering::SeqCst)) }
        });

        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(rx.recv().await, Some(1));
        assert!(task.is_active());
        assert_eq!(task.name(), "count");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let task = PeriodicTask::spawn("noop", Duration::from_secs(1), tx, || async { Some(7) });

        assert_eq!(rx.recv().await, Some(7));
        task.cancel();
        assert!(!task.is_active());

        // the sender is dropped once the loop exits, closing the channel
        while rx.recv().await.is_some() {}
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let task = PeriodicTask::spawn("noop", Duration::from_secs(1), tx, || async { Some(1) });
        drop(task);

        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_results_are_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let counter = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&counter);

        let _task = PeriodicTask::spawn("odd", Duration::from_millis(500), tx, move || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                (n % 2 == 1).then_some(n)
            }
        });

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(3));
    }
}
