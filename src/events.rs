use std::{collections::HashMap, sync::Arc};

use log::debug;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{dom::ReadyState, id_type};

id_type!(SubscriptionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ReadyStateChanged,
    ActionActivated,
    RatingSet,
    ConfigChanged,
}

/// Notifications the host delivers to the integration.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ReadyStateChanged(ReadyState),
    ActionActivated { name: String, param: Option<f64> },
    RatingSet(f64),
    ConfigChanged(String),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::ReadyStateChanged(..) => EventKind::ReadyStateChanged,
            HostEvent::ActionActivated { .. } => EventKind::ActionActivated,
            HostEvent::RatingSet(..) => EventKind::RatingSet,
            HostEvent::ConfigChanged(..) => EventKind::ConfigChanged,
        }
    }
}

#[derive(Debug)]
struct Subscription {
    kind: EventKind,
    sender: mpsc::UnboundedSender<HostEvent>,
}

/// Routes host events to the receivers that subscribed to their kind.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<Mutex<HashMap<SubscriptionId, Subscription>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
        sender: mpsc::UnboundedSender<HostEvent>,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscriptions
            .lock()
            .insert(id, Subscription { kind, sender });
        debug!("Subscription {id} registered for {kind:?}");
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.lock().remove(&id).is_some()
    }

    /// Returns the number of subscribers the event was delivered to. Subscribers whose
    /// receiver is gone are dropped.
    pub fn emit(&self, event: HostEvent) -> usize {
        let kind = event.kind();
        let mut subscriptions = self.subscriptions.lock();
        let mut delivered = 0;
        subscriptions.retain(|id, subscription| {
            if subscription.kind != kind {
                return true;
            }
            if subscription.sender.send(event.clone()).is_err() {
                debug!("Dropping closed subscription {id}");
                return false;
            }
            delivered += 1;
            true
        });
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deliver_only_subscribed_kinds() {
        // given
        let bus = EventBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        bus.subscribe(EventKind::RatingSet, tx);

        // when
        let ignored = bus.emit(HostEvent::ConfigChanged("key".to_string()));
        let delivered = bus.emit(HostEvent::RatingSet(1.0));

        // then
        assert_eq!(ignored, 0);
        assert_eq!(delivered, 1);
        assert_eq!(rx.try_recv().unwrap(), HostEvent::RatingSet(1.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_stop_delivering_after_unsubscribe() {
        // given
        let bus = EventBus::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = bus.subscribe(EventKind::ActionActivated, tx);

        // when
        let removed = bus.unsubscribe(id);
        let delivered = bus.emit(HostEvent::ActionActivated {
            name: "play".to_string(),
            param: None,
        });

        // then
        assert!(removed);
        assert!(!bus.unsubscribe(id));
        assert_eq!(delivered, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn should_drop_subscriptions_with_closed_receivers() {
        // given
        let bus = EventBus::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = bus.subscribe(EventKind::RatingSet, tx);
        drop(rx);

        // when
        let delivered = bus.emit(HostEvent::RatingSet(0.0));

        // then
        assert_eq!(delivered, 0);
        assert!(!bus.unsubscribe(id));
    }
}
