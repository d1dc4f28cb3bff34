//! OS signal handling.
//!
//! SIGINT (Ctrl-C) while a request is in flight ends the work so cleanup
//! still runs. The remote request is not cancelled.

use std::future::Future;

use crate::error::Error;

/// Resolve when the process receives Ctrl-C.
///
/// If the handler cannot be installed the future never resolves.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::warn!("Interrupt received");
}

/// Run `work` until it finishes or `interrupt` resolves.
///
/// On interrupt `work` is dropped and [`Error::Interrupted`] returned.
pub async fn until_interrupted<T, W, I>(work: W, interrupt: I) -> crate::Result<T>
where
    W: Future<Output = crate::Result<T>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        _ = interrupt => Err(Error::Interrupted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_work() {
        let (tx, rx) = oneshot::channel::<()>();
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        let work = async move {
            // stands in for anchoring and confirmation waits
            sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(1u8)
        };
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            let _ = tx.send(());
        });

        let result = until_interrupted(work, async {
            let _ = rx.await;
        })
        .await;
        assert!(matches!(result, Err(Error::Interrupted)));

        sleep(Duration::from_secs(120)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_work_finishes_first() {
        let result = until_interrupted(async { Ok("done") }, std::future::pending()).await;
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_work_error_passes_through() {
        let result: crate::Result<()> = until_interrupted(
            async { Err(Error::Timeout("no fulfillment".into())) },
            std::future::pending(),
        )
        .await;
        assert_eq!(result.unwrap_err().kind(), "timeout");
    }
}
