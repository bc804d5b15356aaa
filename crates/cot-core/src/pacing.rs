use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Spacing policy between consecutive recipients.
///
/// The dispatch loop calls [`Pacer::pause`] after every recipient, whatever the
/// outcome. Adaptive strategies (token bucket, backoff on FLOOD_WAIT) plug in here.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleep a fixed interval after every send.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay {
    pub interval: Duration,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        if self.interval > Duration::ZERO {
            sleep(self.interval).await;
        }
    }
}
