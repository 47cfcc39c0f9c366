#[cfg(test)]
#[path = "selection_events_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::domain::models::SelectionEvent;

type Subscribers = Arc<DashMap<u64, mpsc::UnboundedSender<SelectionEvent>>>;

/// Fan-out point for selection changes. Whatever surface watches the user's
/// selection publishes here; interested parties subscribe.
#[derive(Default)]
pub struct SelectionEvents {
    next_id: AtomicU64,
    subscribers: Subscribers,
}

/// Receiving end of a subscription. Dropping it unregisters.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SelectionEvent>,
    subscribers: Subscribers,
}

impl SelectionEvents {
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel::<SelectionEvent>();
        self.subscribers.insert(id, tx);

        return Subscription {
            id,
            rx,
            subscribers: self.subscribers.clone(),
        };
    }

    /// Delivers the event to every live subscriber, returning how many
    /// received it.
    pub fn publish(&self, event: SelectionEvent) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|_, tx| {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
                return true;
            }
            return false;
        });

        return delivered;
    }

    pub fn subscriber_count(&self) -> usize {
        return self.subscribers.len();
    }
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<SelectionEvent> {
        return self.rx.recv().await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
    }
}
