use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::trace;

/// Quiet period before typed search text is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Rate-limits search text: every push restarts the quiet period, and only
/// the last value pushed before the period elapses is emitted.
///
/// Dropping the debouncer flushes a pending value and ends the task.
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    pub fn spawn(quantum: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input, mut rx) = mpsc::unbounded_channel::<String>();
        let (output, settled) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => {
                                trace!(value = %value, "search text replaced before settling");
                                latest = value;
                            }
                            None => {
                                let _ = output.send(latest);
                                return;
                            }
                        },
                        _ = sleep(quantum) => {
                            if output.send(latest).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { input }, settled)
    }

    /// Returns false once the receiving side is gone.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.input.send(text.into()).is_ok()
    }
}
