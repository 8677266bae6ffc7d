// events/mod.rs
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::WsMessage;

const SUBSCRIBER_CAPACITY: usize = 32;

/// Fan-out of light changes to live feed connections.
pub struct EventBus {
    subscribers: DashMap<Uuid, broadcast::Sender<WsMessage>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    pub fn publish(&self, message: WsMessage) {
        for subscriber in self.subscribers.iter() {
            // A lagging or closing receiver is dropped on its own side.
            let _ = subscriber.value().send(message.clone());
        }
    }

    pub fn subscribe(&self) -> (Uuid, broadcast::Receiver<WsMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = broadcast::channel(SUBSCRIBER_CAPACITY);
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: &Uuid) {
        self.subscribers.remove(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
