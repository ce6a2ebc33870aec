//! Host-side endpoint of an informer channel.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;

use infraview_core::{InformerAction, InformerMessage};

/// Reads informer messages for one action.
///
/// A receiver that falls more than the channel buffer behind loses the oldest
/// messages. The loss is logged and counted; reading continues with the
/// oldest message still buffered.
#[derive(Debug)]
pub struct InformerReceiver<T> {
    /// Action this endpoint delivers.
    action: InformerAction,
    /// Underlying broadcast receiver.
    rx: broadcast::Receiver<InformerMessage<T>>,
    /// Messages skipped because this receiver lagged.
    dropped: u64,
}

impl<T: Clone> InformerReceiver<T> {
    pub(crate) fn new(action: InformerAction, rx: broadcast::Receiver<InformerMessage<T>>) -> Self {
        Self {
            action,
            rx,
            dropped: 0,
        }
    }

    /// Waits for the next message. Returns `None` once the dispatcher is gone.
    pub async fn recv(&mut self) -> Option<InformerMessage<T>> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => return Some(msg),
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next buffered message without waiting.
    pub fn try_recv(&mut self) -> Option<InformerMessage<T>> {
        loop {
            match self.rx.try_recv() {
                Ok(msg) => return Some(msg),
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Returns the action this endpoint delivers.
    pub fn action(&self) -> InformerAction {
        self.action
    }

    /// Returns how many messages this receiver has lost to lag.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn record_lag(&mut self, skipped: u64) {
        self.dropped += skipped;
        warn!(
            action = %self.action,
            skipped,
            total_dropped = self.dropped,
            "Informer receiver lagged, messages dropped"
        );
    }
}
