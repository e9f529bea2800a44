use tokio::sync::watch;

/// Creates the termination channel: the trigger is handed to whatever
/// listens for process signals, the receiver to the agent.
pub fn channel() -> (Trigger, Shutdown) {
    let (tx, rx) = watch::channel(());
    (Trigger { tx }, Shutdown { rx })
}

/// Sending half of the termination channel.
#[derive(Clone)]
pub struct Trigger {
    tx: watch::Sender<()>,
}

impl Trigger {
    pub fn trigger(&self) {
        self.tx.send_replace(());
    }
}

/// Receiving half of the termination channel. A single delivery ends the
/// agent, as does dropping every [`Trigger`].
pub struct Shutdown {
    rx: watch::Receiver<()>,
}

impl Shutdown {
    /// Waits until termination has been requested.
    pub async fn recv(&mut self) {
        let _ = self.rx.changed().await;
    }

    /// Returns true once termination has been requested, without waiting.
    pub fn is_requested(&self) -> bool {
        self.rx.has_changed().unwrap_or(true)
    }
}
