use log::warn;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Wait for `tasks` to finish in order, giving up after `grace` in total.
/// Returns false when the grace period ran out.
pub async fn wait_for(grace: Duration, tasks: Vec<JoinHandle<()>>) -> bool {
    let all = async {
        for task in tasks {
            if let Err(e) = task.await {
                warn!("task ended abnormally during shutdown: {e}");
            }
        }
    };
    timeout(grace, all).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::debounce::Debouncer;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn pending_save_reaches_the_worker_before_exit() {
        let (save_tx, save_rx) = mpsc::channel(4);
        let (request_tx, mut request_rx) = mpsc::channel(4);
        let (sent_tx, mut sent_rx) = mpsc::channel(4);

        let debounce = tokio::spawn(Debouncer::new(Duration::from_millis(500), save_rx, request_tx).run());
        let worker = tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let _ = sent_tx.send(request).await;
            }
        });

        save_tx.send("toggle").await.unwrap();
        drop(save_tx);

        let start = Instant::now();
        assert!(wait_for(Duration::from_millis(100), vec![debounce, worker]).await);
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(sent_rx.recv().await, Some("toggle"));
        assert_eq!(sent_rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_grace_period() {
        let stuck = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert!(!wait_for(Duration::from_millis(200), vec![stuck]).await);
    }
}
