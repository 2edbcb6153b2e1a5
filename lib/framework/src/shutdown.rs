use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing::warn;

pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Broadcasts to every subscriber once ctrl-c or SIGTERM arrives.
    pub fn listen(self) {
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("shutdown signal received");
            if self.sender.send(()).is_err() {
                warn!("no shutdown subscriber left");
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            warn!("failed to listen SIGTERM, error={err}");
            let _: Option<()> = signal::ctrl_c().await.ok();
            return;
        }
    };
    tokio::select! {
        _ = signal::ctrl_c() => {},
        _ = terminate.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _: Option<()> = signal::ctrl_c().await.ok();
}
