use std::fmt;
use std::sync::Weak;
use tracing::trace;

use super::handle::ChannelInner;

/// Identifies one `on`/`once` registration within a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token returned when subscribing to an event.
///
/// Dropping it leaves the handler in place; call [`Subscription::unsubscribe`]
/// to remove it. The token only holds a weak link, so it never keeps its
/// channel alive.
#[derive(Clone)]
pub struct Subscription {
    channel: Weak<ChannelInner>,
    event: String,
    id: SubscriptionId,
}

impl Subscription {
    pub(crate) fn new(channel: Weak<ChannelInner>, event: &str, id: SubscriptionId) -> Self {
        Self {
            channel,
            event: event.to_string(),
            id,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Whether the handler is still registered
    pub fn is_active(&self) -> bool {
        let Some(channel) = self.channel.upgrade() else {
            return false;
        };

        let registry = channel.lock();
        registry.has_listener(&self.event, self.id)
    }

    /// Remove this exact handler from its event.
    ///
    /// Calling it again, or after the channel is gone, does nothing.
    pub fn unsubscribe(&self) {
        let Some(channel) = self.channel.upgrade() else {
            return;
        };

        let removed = channel.lock().remove_listener(&self.event, self.id);
        trace!(
            channel = %channel.name,
            event = %self.event,
            subscription = %self.id,
            removed,
            "Unsubscribed"
        );
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}
