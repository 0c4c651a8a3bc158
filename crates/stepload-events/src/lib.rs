//! Step and hook lifecycle notifications.
//!
//! A [`MessageCenter`] is a synchronous multicast channel: [`publish`]
//! hands the message to every observer subscribed at that moment, in
//! subscription order, and returns. Nothing is buffered or replayed.
//!
//! The process-wide instance is reached through [`message_center`]. Code
//! that only observes should receive a `&MessageCenter` instead of calling
//! it directly, so tests can pass a local center.
//!
//! [`publish`]: MessageCenter::publish

mod message;

pub use message::{Action, Message, StepType};

use log::trace;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Observer = Arc<dyn Fn(&Message) + Send + Sync>;

struct Subscriber {
    id: u64,
    observer: Observer,
}

/// Synchronous publish/subscribe channel for lifecycle messages
pub struct MessageCenter {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: AtomicU64,
}

/// Handle returned by [`MessageCenter::subscribe`]. Dropping it keeps the
/// observer subscribed; call [`Subscription::unsubscribe`] to tear down.
#[must_use = "keep the subscription to unsubscribe later"]
pub struct Subscription {
    id: u64,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes the observer. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let mut subscribers = lock(&self.subscribers);
        match subscribers.iter().position(|s| s.id == self.id) {
            Some(pos) => {
                subscribers.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl MessageCenter {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `observer` for every message published from now on.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.subscribers).push(Subscriber {
            id,
            observer: Arc::new(observer),
        });
        Subscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Delivers `message` to the current subscribers and returns.
    ///
    /// Observers run outside the internal lock, so they may subscribe or
    /// unsubscribe; such changes take effect from the next publish.
    pub fn publish(&self, message: &Message) {
        let snapshot: Vec<Observer> = lock(&self.subscribers)
            .iter()
            .map(|s| Arc::clone(&s.observer))
            .collect();

        trace!("publishing {:?} for '{}' to {} observer(s)", message.action, message.tag, snapshot.len());
        for observer in snapshot {
            observer(message);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Drops every subscriber.
    pub fn clear(&self) {
        lock(&self.subscribers).clear();
    }
}

impl Default for MessageCenter {
    fn default() -> Self {
        Self::new()
    }
}

// Poisoned locks are recovered; the list is never left half-modified.
fn lock(subscribers: &Mutex<Vec<Subscriber>>) -> MutexGuard<'_, Vec<Subscriber>> {
    subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

static MESSAGE_CENTER: Lazy<MessageCenter> = Lazy::new(MessageCenter::new);

/// The process-wide message center.
pub fn message_center() -> &'static MessageCenter {
    &MESSAGE_CENTER
}

/// Publishes `message` on the process-wide message center.
pub fn send_message(message: Message) {
    message_center().publish(&message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(center: &MessageCenter) -> (Subscription, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = center.subscribe(move |m| sink.lock().unwrap().push(m.clone()));
        (subscription, seen)
    }

    #[test]
    fn test_publish_reaches_current_subscribers_only() {
        let center = MessageCenter::new();
        let (_early, early_seen) = collector(&center);

        let message = Message::new("@login", Action::BeforeRunStep).with_type(StepType::Context);
        center.publish(&message);

        let (_late, late_seen) = collector(&center);

        assert_eq!(early_seen.lock().unwrap().as_slice(), &[message]);
        assert!(late_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delivery_follows_subscription_order() {
        let center = MessageCenter::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut subscriptions = Vec::new();
        for n in 0..3 {
            let order = Arc::clone(&order);
            subscriptions.push(center.subscribe(move |_| order.lock().unwrap().push(n)));
        }

        center.publish(&Message::new("t", Action::AfterRunHook));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let center = MessageCenter::new();
        let (subscription, seen) = collector(&center);
        assert_eq!(center.subscriber_count(), 1);

        assert!(subscription.unsubscribe());
        assert_eq!(center.subscriber_count(), 0);

        center.publish(&Message::new("t", Action::BeforeRunHook));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_after_clear_reports_missing() {
        let center = MessageCenter::new();
        let (subscription, _) = collector(&center);
        center.clear();
        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn test_observer_may_subscribe_during_publish() {
        let center = Arc::new(MessageCenter::new());
        let inner_hits = Arc::new(Mutex::new(0));

        let center_ref = Arc::clone(&center);
        let hits = Arc::clone(&inner_hits);
        let _outer = center.subscribe(move |_| {
            let hits = Arc::clone(&hits);
            let _ = center_ref.subscribe(move |_| *hits.lock().unwrap() += 1);
        });

        center.publish(&Message::new("t", Action::BeforeRunStep));
        assert_eq!(*inner_hits.lock().unwrap(), 0);
        assert_eq!(center.subscriber_count(), 2);

        center.publish(&Message::new("t", Action::AfterRunStep));
        assert_eq!(*inner_hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_global_center_round_trip() {
        let (subscription, seen) = collector(message_center());
        send_message(Message::new("global-tag", Action::AfterRunStep));
        assert!(subscription.unsubscribe());

        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|m| m.tag == "global-tag"));
    }
}
