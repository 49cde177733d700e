use tokio::sync::watch;

/// Cooperative stop signal for the poll loop.
///
/// - `cancel()` flips a boolean and wakes waiters.
/// - The loop selects on either the next tick or [`cancelled`], and a query
///   that settles after `cancel()` is dropped instead of published.
#[derive(Clone, Debug)]
pub struct CancellationState {
    tx: watch::Sender<bool>,
}

impl Default for CancellationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Resolves once the flag observed by `cancel_rx` is set.
///
/// Never resolves if the sender is dropped without cancelling.
pub async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            // Sender dropped; treat as non-cancelable.
            std::future::pending::<()>().await;
        }
    }
}
