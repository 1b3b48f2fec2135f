//! Cooperative cancellation for a running scan.

use std::time::Duration;

use tokio::sync::watch;

/// Requests that a scan stop at its next chunk boundary
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Creates a handle and the signal it controls
    pub fn new() -> (Self, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, StopSignal { rx: Some(rx) })
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Another signal observing this handle
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Observed by the scanner between chunks and while it sleeps
///
/// Dropping the [`StopHandle`] without calling `stop` never stops the scan.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl StopSignal {
    /// A signal that is never raised
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_stopped(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once stop is requested
    pub async fn stopped(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            let raised = rx.wait_for(|stopped| *stopped).await.is_ok();
            if raised {
                return;
            }
        }
        std::future::pending::<()>().await;
    }

    /// Sleeps for `duration`; returns `true` if interrupted by a stop request
    pub async fn sleep_or_stop(&mut self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        if duration.is_zero() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.stopped() => true,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_sleep() {
        let (handle, mut signal) = StopHandle::new();

        let sleeper = tokio::spawn(async move { signal.sleep_or_stop(Duration::from_secs(3600)).await });
        tokio::task::yield_now().await;
        handle.stop();

        assert!(sleeper.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_stop() {
        let (_handle, mut signal) = StopHandle::new();
        assert!(!signal.sleep_or_stop(Duration::from_secs(1)).await);
        assert!(!signal.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_never_stops() {
        let (handle, mut signal) = StopHandle::new();
        drop(handle);
        assert!(!signal.sleep_or_stop(Duration::from_millis(10)).await);
        assert!(!StopSignal::never().is_stopped());
    }

    #[test]
    fn test_signals_share_state() {
        let (handle, first) = StopHandle::new();
        let second = handle.signal();
        handle.stop();
        assert!(first.is_stopped());
        assert!(second.is_stopped());
    }
}
