use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Trailing-edge debounce with a single pending slot.
///
/// Every value pushed into `input` replaces the pending one and restarts the
/// window. Once `window` passes with no new value, the pending value is
/// forwarded to `output`. A pending value is flushed when `input` closes.
pub struct Debouncer<T> {
    window: Duration,
    input: mpsc::Receiver<T>,
    output: mpsc::Sender<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration, input: mpsc::Receiver<T>, output: mpsc::Sender<T>) -> Self {
        Self { window, input, output }
    }

    pub async fn run(mut self) {
        let mut pending: Option<T> = None;
        loop {
            let Some(value) = pending.take() else {
                match self.input.recv().await {
                    Some(value) => pending = Some(value),
                    None => return,
                }
                continue;
            };

            tokio::select! {
                next = self.input.recv() => match next {
                    Some(newer) => pending = Some(newer),
                    None => {
                        let _ = self.output.send(value).await;
                        return;
                    }
                },
                _ = sleep(self.window) => {
                    if self.output.send(value).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, timeout};

    fn spawn_debouncer(window_ms: u64) -> (mpsc::Sender<u32>, mpsc::Receiver<u32>) {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::channel(16);
        tokio::spawn(Debouncer::new(Duration::from_millis(window_ms), in_rx, out_tx).run());
        (in_tx, out_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_within_window_emits_once_with_latest_value() {
        let (tx, mut rx) = spawn_debouncer(500);
        let start = Instant::now();

        tx.send(1).await.unwrap();
        sleep(Duration::from_millis(40)).await;
        tx.send(2).await.unwrap();
        sleep(Duration::from_millis(40)).await;
        tx.send(3).await.unwrap();

        assert_eq!(rx.recv().await, Some(3));
        assert!(start.elapsed() >= Duration::from_millis(580));

        let extra = timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(extra.is_err(), "only one value should be emitted, got {extra:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_gap_longer_than_window_emits_twice() {
        let (tx, mut rx) = spawn_debouncer(500);

        tx.send(1).await.unwrap();
        assert_eq!(rx.recv().await, Some(1));

        sleep(Duration::from_millis(700)).await;
        tx.send(2).await.unwrap();
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_input_flushes_pending_value() {
        let (tx, mut rx) = spawn_debouncer(500);
        tx.send(9).await.unwrap();
        drop(tx);
        assert_eq!(rx.recv().await, Some(9));
        assert_eq!(rx.recv().await, None);
    }
}
