//! CAN bus interface abstraction.
//!
//! The bus hands out `FrameSubscription`s: a filtered stream of data frames
//! delivered on the transport's own task. Dropping the subscription releases
//! it; the transport notices the closed channel and stops forwarding.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::CanResult;
use crate::types::{CanFrame, FrameFilter};

/// Trait for CAN bus interface implementations.
#[async_trait]
pub trait CanInterface: Send + Sync {
    /// Start receiving every data frame that matches `filter`.
    async fn subscribe(&self, filter: FrameFilter) -> CanResult<FrameSubscription>;
}

/// Receiving half of a bus subscription.
#[derive(Debug)]
pub struct FrameSubscription {
    filter: FrameFilter,
    rx: mpsc::UnboundedReceiver<CanFrame>,
}

impl FrameSubscription {
    /// Create a subscription and the sender the transport delivers into.
    pub fn channel(filter: FrameFilter) -> (mpsc::UnboundedSender<CanFrame>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { filter, rx })
    }

    pub fn filter(&self) -> FrameFilter {
        self.filter
    }

    /// Next matching frame, or `None` once the transport has gone away.
    pub async fn recv(&mut self) -> Option<CanFrame> {
        self.rx.recv().await
    }
}
