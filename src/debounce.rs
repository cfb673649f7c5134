use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// Coalesces rapid inputs into one delayed delivery on an mpsc channel.
///
/// Each `schedule` cancels the previous timer and arms a fresh one, so
/// only the last value within a burst is delivered. Dropping the
/// debouncer cancels any pending delivery.
pub struct Debouncer {
    delay: Duration,
    tx: Sender<String>,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration, tx: Sender<String>) -> Debouncer {
        Debouncer {
            delay,
            tx,
            pending: None,
        }
    }

    /// Arm the timer for `value`, replacing any pending delivery.
    pub fn schedule(&mut self, value: String) {
        self.cancel();
        let token = CancellationToken::new();
        let guard = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(value).await;
                }
            }
        });
        self.pending = Some(token);
    }

    /// Drop the pending delivery, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
