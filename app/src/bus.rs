//! Synchronous publish/subscribe fan-out of world events.

use std::fmt;

use farm_royale_core::Event;
use log::warn;

/// Handle identifying a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Event) -> anyhow::Result<()>>;

/// Listeners notified of every event the world broadcasts, in registration order.
#[derive(Default)]
pub(crate) struct NotificationBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl NotificationBus {
    pub(crate) fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    /// Delivers `events` to every listener. A failing listener is logged and skipped.
    pub(crate) fn publish(&mut self, events: &[Event]) {
        for event in events {
            for (id, listener) in &mut self.listeners {
                if let Err(error) = listener(event) {
                    warn!("listener {} failed on {event:?}: {error:#}", id.0);
                }
            }
        }
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
