use std::future::pending;
use std::time::Duration;
use tokio::sync::watch;

/// Fires the shutdown signal for every cloned [`Shutdown`].
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cooperative stop signal, checked by loops between iterations.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl Shutdown {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (trigger, shutdown) = channel();
        drop(trigger);
        shutdown
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `period`. Returns `false` if shutdown fired first.
    pub async fn sleep(&mut self, period: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        let rx = &mut self.rx;
        tokio::select! {
            _ = tokio::time::sleep(period) => true,
            _ = async {
                // A dropped trigger can never fire.
                if rx.wait_for(|stop| *stop).await.is_err() {
                    pending::<()>().await;
                }
            } => false,
        }
    }
}

/// Trigger shutdown on Ctrl-C.
pub fn spawn_ctrl_c(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, stopping after the current step");
            trigger.trigger();
        }
    });
}
