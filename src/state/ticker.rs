use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Sends a clone of `event` every `period` until the receiver goes away.
///
/// Drives the once-a-second UI tick (countdown, announcement blink) and the
/// periodic fixture refresh.
pub struct Ticker<T> {
    period: Duration,
    event: T,
    sink: mpsc::Sender<T>,
    skip_first: bool,
}

impl<T: Clone> Ticker<T> {
    pub fn new(period: Duration, event: T, sink: mpsc::Sender<T>) -> Self {
        Self { period, event, sink, skip_first: false }
    }

    /// Skip the immediate first tick so startup loading isn't double-triggered.
    pub fn skip_first(mut self) -> Self {
        self.skip_first = true;
        self
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        if self.skip_first {
            ticks.tick().await;
        }

        loop {
            ticks.tick().await;
            if self.sink.send(self.event.clone()).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_the_skipped_first() {
        let (tx, mut rx) = mpsc::channel(8);
        let start = Instant::now();
        tokio::spawn(Ticker::new(Duration::from_secs(1), "tick", tx).skip_first().run());

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some("tick"));
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel::<u8>(1);
        let handle = tokio::spawn(Ticker::new(Duration::from_millis(10), 1, tx).run());
        drop(rx);
        handle.await.expect("ticker task should finish cleanly");
    }
}
