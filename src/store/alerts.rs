use std::time::Duration;

use tokio::task::JoinHandle;

/// Timer behind the transient "feature unavailable" banner: the clear
/// callback runs once after a fixed delay. At most one timer is ever
/// pending: scheduling again replaces the old one, and dropping the handle
/// (the owning view going away) cancels an in-flight timer.
#[derive(Default)]
pub struct TransientAlert {
    pending: Option<JoinHandle<()>>,
}

impl TransientAlert {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule<F>(&mut self, delay: Duration, clear: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            clear();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for TransientAlert {
    fn drop(&mut self) {
        self.cancel();
    }
}
