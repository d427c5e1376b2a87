use std::collections::{BTreeMap, HashMap};

use super::handler::Handler;
use super::subscription::SubscriptionId;

struct Listener {
    handler: Handler,
    once: bool,
}

struct Replier {
    handler: Handler,
    once: bool,
}

/// Event and request handler tables for one channel.
///
/// Listeners are keyed by subscription id; ids only grow, so map order is
/// subscription order. A request name maps to at most one replier.
#[derive(Default)]
pub(crate) struct Registry {
    events: HashMap<String, BTreeMap<SubscriptionId, Listener>>,
    requests: HashMap<String, Replier>,
    next_id: u64,
}

impl Registry {
    pub fn add_listener(&mut self, event: &str, handler: Handler, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.events
            .entry(event.to_string())
            .or_default()
            .insert(id, Listener { handler, once });
        id
    }

    /// Returns whether a listener was actually removed
    pub fn remove_listener(&mut self, event: &str, id: SubscriptionId) -> bool {
        let Some(listeners) = self.events.get_mut(event) else {
            return false;
        };

        let removed = listeners.remove(&id).is_some();
        if listeners.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    pub fn remove_all_listeners(&mut self, event: &str) -> usize {
        self.events.remove(event).map_or(0, |listeners| listeners.len())
    }

    /// Snapshot the listeners for one delivery, in subscription order.
    ///
    /// Nothing is retired here; a one-shot listener is only removed by the
    /// delivery that is about to run it.
    pub fn listeners(&self, event: &str) -> Vec<(SubscriptionId, bool, Handler)> {
        self.events.get(event).map_or_else(Vec::new, |listeners| {
            listeners
                .iter()
                .map(|(id, listener)| (*id, listener.once, listener.handler.clone()))
                .collect()
        })
    }

    pub fn has_listener(&self, event: &str, id: SubscriptionId) -> bool {
        self.events
            .get(event)
            .is_some_and(|listeners| listeners.contains_key(&id))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, BTreeMap::len)
    }

    /// Returns whether an existing replier was replaced
    pub fn set_replier(&mut self, request: &str, handler: Handler, once: bool) -> bool {
        self.requests
            .insert(request.to_string(), Replier { handler, once })
            .is_some()
    }

    pub fn remove_replier(&mut self, request: &str) -> bool {
        self.requests.remove(request).is_some()
    }

    /// Look up the replier for one request, retiring it if it was one-shot
    pub fn take_replier(&mut self, request: &str) -> Option<Handler> {
        let replier = self.requests.get(request)?;
        if !replier.once {
            return Some(replier.handler.clone());
        }

        self.requests.remove(request).map(|replier| replier.handler)
    }

    pub fn is_replying(&self, request: &str) -> bool {
        self.requests.contains_key(request)
    }

    pub fn total_listeners(&self) -> usize {
        self.events.values().map(BTreeMap::len).sum()
    }

    pub fn total_repliers(&self) -> usize {
        self.requests.len()
    }
}
