//! Realtime fan-out of feed events and the live viewer count.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::db::Listing;

const CHANNEL_CAPACITY: usize = 256;

/// Server to client event. Serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FeedEvent {
    NewPost(Listing),
    DeletedPost { id: i64 },
    OnlineCount(usize),
}

/// Process-wide broadcaster. Delivery is best effort: subscribers only see
/// events sent while they are subscribed, and lagging ones skip ahead.
pub struct Broadcaster {
    tx: broadcast::Sender<FeedEvent>,
    viewers: AtomicUsize,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            viewers: AtomicUsize::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.tx.subscribe()
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }

    /// Register a new viewer and push the updated count to everyone.
    pub fn connect(&self) -> usize {
        let count = self.viewers.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit_count();
        count
    }

    /// Unregister a viewer. The count never drops below zero.
    pub fn disconnect(&self) -> usize {
        let previous = self
            .viewers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        self.emit_count();
        previous.saturating_sub(1)
    }

    pub fn broadcast_created(&self, listing: Listing) {
        self.send(FeedEvent::NewPost(listing));
    }

    pub fn broadcast_deleted(&self, listing_id: i64) {
        self.send(FeedEvent::DeletedPost { id: listing_id });
    }

    pub fn emit_count(&self) {
        self.send(FeedEvent::OnlineCount(self.viewer_count()));
    }

    fn send(&self, event: FeedEvent) {
        // Err only means nobody is listening right now
        let _ = self.tx.send(event);
    }

    /// Emit the viewer count on a fixed period until the task is aborted.
    pub fn spawn_heartbeat(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let broadcaster = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                broadcaster.emit_count();
            }
        })
    }
}
