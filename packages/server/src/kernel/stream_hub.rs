//! In-process realtime relay.
//!
//! Topic-keyed broadcast channels that carry JSON pushes to connected SSE
//! clients. Two topic families exist:
//!
//! - `user:{userId}`: personal channel (step reminders)
//! - `event:{eventId}`: membership changes of one event
//!
//! The connection table is process-local. Clients that reconnect simply
//! subscribe again; nothing is replayed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::common::{EventId, UserId};

const DEFAULT_CAPACITY: usize = 256;

/// Topic for pushes addressed to one user
pub fn user_topic(user_id: UserId) -> String {
    format!("user:{}", user_id)
}

/// Topic for pushes addressed to everyone watching an event
pub fn event_topic(event_id: EventId) -> String {
    format!("event:{}", event_id)
}

/// Cloneable pub/sub hub keyed by topic string.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Push a value to a topic. Returns how many receivers got it; zero when
    /// nobody is connected.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) -> usize {
        let channels = self.channels.read().await;
        match channels.get(topic) {
            Some(tx) => tx.send(value).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn publish_to_user(&self, user_id: UserId, value: serde_json::Value) -> usize {
        self.publish(&user_topic(user_id), value).await
    }

    pub async fn publish_to_event(&self, event_id: EventId, value: serde_json::Value) -> usize {
        self.publish(&event_topic(event_id), value).await
    }

    /// Subscribe to a topic, creating its channel on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop channels nobody listens to anymore.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}
