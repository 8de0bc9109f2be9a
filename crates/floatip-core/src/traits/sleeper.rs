//! Suspension between monitor iterations

use async_trait::async_trait;
use std::time::Duration;

/// The single suspension point of the monitor loop
///
/// Tests substitute an implementation that records durations and returns
/// immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
