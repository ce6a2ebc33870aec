//! Informer engine configuration.

use serde::{Deserialize, Serialize};

/// Informer channel and event queue sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformerConfig {
    /// Ring buffer size of each per-action broadcast channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Capacity of the backend change event queue.
    #[serde(default = "default_event_queue")]
    pub event_queue_size: usize,
}

impl Default for InformerConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            event_queue_size: default_event_queue(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_event_queue() -> usize {
    1024
}
