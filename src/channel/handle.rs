use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, trace};

use super::handler::{into_handler, Handler, IntoReply, Payload};
use super::registry::Registry;
use super::subscription::Subscription;
use crate::shared::BusError;

pub(crate) struct ChannelInner {
    pub(crate) name: String,
    registry: Mutex<Registry>,
}

impl ChannelInner {
    /// Handlers never run while this guard is held, so a poisoned lock still
    /// holds a consistent registry.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A named scope for events (many listeners) and requests (one replier).
///
/// `Channel` is a cheap handle: clones share the same registries, and
/// equality is identity. Every operation runs to completion on the calling
/// thread; `trigger` and `request` block until their handlers return.
///
/// A handler that needs to reach its own channel should capture a
/// [`WeakChannel`] from [`Channel::downgrade`]. Capturing a `Channel` clone
/// keeps the channel alive for as long as the handler stays registered.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    /// Creates an empty channel outside of any bus
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                name: name.into(),
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// A handle that does not keep the channel alive
    pub fn downgrade(&self) -> WeakChannel {
        WeakChannel {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same channel instance
    pub fn same_as(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribe `handler` to `event`.
    ///
    /// Handlers fire in subscription order. The returned [`Subscription`]
    /// removes exactly this registration, however many times it is used.
    pub fn on<F, R>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Payload) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.subscribe(event, into_handler(handler), false)
    }

    /// Like [`Channel::on`], but the handler is removed when it first fires,
    /// so it runs at most once
    pub fn once<F, R>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Payload) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.subscribe(event, into_handler(handler), true)
    }

    fn subscribe(&self, event: &str, handler: Handler, once: bool) -> Subscription {
        let id = self.inner.lock().add_listener(event, handler, once);
        trace!(
            channel = %self.inner.name,
            event = %event,
            subscription = %id,
            once,
            "Subscribed"
        );
        Subscription::new(Arc::downgrade(&self.inner), event, id)
    }

    /// Remove every handler subscribed to `event`
    pub fn off(&self, event: &str) -> &Self {
        let removed = self.inner.lock().remove_all_listeners(event);
        trace!(channel = %self.inner.name, event = %event, removed, "Cleared listeners");
        self
    }

    /// Deliver `payload` to every handler of `event`, in subscription order.
    ///
    /// No subscribers is not an error. The first handler to fail stops the
    /// delivery and its error is returned; handlers after it do not run for
    /// this call. Handlers subscribed or removed while a delivery is running
    /// take effect from the next `trigger`, except one-shot handlers, which
    /// are skipped once gone. A payload that fails to serialize leaves every
    /// handler in place.
    pub fn trigger<P: Serialize>(&self, event: &str, payload: P) -> Result<(), BusError> {
        let listeners = self.inner.lock().listeners(event);
        trace!(
            channel = %self.inner.name,
            event = %event,
            listeners = listeners.len(),
            "Triggering event"
        );

        if listeners.is_empty() {
            return Ok(());
        }

        let payload = serde_json::to_value(payload)?;
        for (id, once, handler) in listeners {
            if once && !self.inner.lock().remove_listener(event, id) {
                continue;
            }
            handler(&payload).map_err(|source| BusError::handler(&self.inner.name, event, source))?;
        }
        Ok(())
    }

    /// Answer `request` with `handler`, replacing any previous replier
    pub fn reply<F, R>(&self, request: &str, handler: F) -> &Self
    where
        F: Fn(&Payload) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.set_replier(request, into_handler(handler), false)
    }

    /// Like [`Channel::reply`], but the handler retires after answering once
    pub fn reply_once<F, R>(&self, request: &str, handler: F) -> &Self
    where
        F: Fn(&Payload) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.set_replier(request, into_handler(handler), true)
    }

    fn set_replier(&self, request: &str, handler: Handler, once: bool) -> &Self {
        let replaced = self.inner.lock().set_replier(request, handler, once);
        trace!(
            channel = %self.inner.name,
            request = %request,
            replaced,
            once,
            "Replier registered"
        );
        self
    }

    /// Stop answering `request`; does nothing if nobody answers it
    pub fn stop_replying(&self, request: &str) -> &Self {
        let removed = self.inner.lock().remove_replier(request);
        trace!(channel = %self.inner.name, request = %request, removed, "Replier removed");
        self
    }

    /// Ask the replier for `request` and hand back its answer.
    ///
    /// Fails with [`BusError::NoHandler`] when nobody replies, and with
    /// [`BusError::Handler`] when the replier itself fails.
    pub fn request<P: Serialize>(&self, request: &str, payload: P) -> Result<Payload, BusError> {
        if !self.is_replying(request) {
            return Err(self.unhandled(request));
        }

        // Serialize before a one-shot replier is retired
        let payload = serde_json::to_value(payload)?;
        let Some(handler) = self.inner.lock().take_replier(request) else {
            return Err(self.unhandled(request));
        };

        trace!(channel = %self.inner.name, request = %request, "Requesting");
        handler(&payload).map_err(|source| BusError::handler(&self.inner.name, request, source))
    }

    fn unhandled(&self, request: &str) -> BusError {
        debug!(channel = %self.inner.name, request = %request, "No replier for request");
        BusError::no_handler(&self.inner.name, request)
    }

    /// [`Channel::request`], decoding the answer into `T`
    pub fn request_as<T, P>(&self, request: &str, payload: P) -> Result<T, BusError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let reply = self.request(request, payload)?;
        Ok(serde_json::from_value(reply)?)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.lock().listener_count(event)
    }

    pub fn is_replying(&self, request: &str) -> bool {
        self.inner.lock().is_replying(request)
    }
}

/// Non-owning counterpart of [`Channel`]
#[derive(Clone)]
pub struct WeakChannel {
    inner: Weak<ChannelInner>,
}

impl WeakChannel {
    /// The channel, if anything still owns it
    pub fn upgrade(&self) -> Option<Channel> {
        self.inner.upgrade().map(|inner| Channel { inner })
    }
}

impl fmt::Debug for WeakChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakChannel")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Channel {}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (listeners, repliers) = {
            let registry = self.inner.lock();
            (registry.total_listeners(), registry.total_repliers())
        };

        f.debug_struct("Channel")
            .field("name", &self.inner.name)
            .field("listeners", &listeners)
            .field("repliers", &repliers)
            .finish()
    }
}
