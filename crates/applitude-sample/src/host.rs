use applitude::runtime::HostSignal;
use applitude::Rejection;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Simulated host bootstrap: ready after a fixed delay, or never if
/// `fail` is set.
#[derive(Debug, Clone)]
pub struct BootDelay {
    pub delay: Duration,
    pub fail: bool,
}

impl BootDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    pub fn failing(delay: Duration) -> Self {
        Self { delay, fail: true }
    }
}

#[async_trait]
impl HostSignal for BootDelay {
    async fn ready(&self) -> Result<(), Rejection> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Rejection::reason("host bootstrap failed"));
        }
        info!(delay_ms = self.delay.as_millis() as u64, "Host bootstrap finished");
        Ok(())
    }
}
