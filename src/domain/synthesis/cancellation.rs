use tokio::sync::watch;

/// Sender side of a run cancellation. Dropping it does not cancel.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

/// Receiver side, cloned into every chunk task
#[derive(Debug, Clone)]
pub struct Cancellation {
    receiver: watch::Receiver<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Cancellation {
    pub fn new() -> (CancellationHandle, Cancellation) {
        let (sender, receiver) = watch::channel(false);
        (CancellationHandle { sender }, Cancellation { receiver })
    }

    /// A cancellation that never fires
    pub fn never() -> Cancellation {
        let (_, cancellation) = Self::new();
        cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is gone without cancelling
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
