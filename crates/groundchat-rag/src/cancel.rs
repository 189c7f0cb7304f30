//! Cooperative cancellation for in-flight turns.

use tokio::sync::watch;

/// Create a linked handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Caller-side trigger. Cancelling is idempotent.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Worker-side observer.
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Resolves once the paired handle cancels. If the handle is dropped
    /// without cancelling, this never resolves.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_resolves_the_token() {
        let (handle, mut token) = cancel_pair();
        assert!(!token.is_cancelled());

        handle.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn uncancelled_token_stays_pending() {
        let (handle, mut token) = cancel_pair();
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
        drop(handle);
    }

    #[tokio::test]
    async fn dropping_the_handle_does_not_cancel() {
        let (handle, mut token) = cancel_pair();
        drop(handle);
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
