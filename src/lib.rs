// Library crate for an in-process message bus
// Named channels carry fire-and-forget events and single-replier requests.

pub mod bus;
pub mod channel;
pub mod shared;

// Re-export commonly used types for easier access
pub use bus::Bus;
pub use channel::{
    Channel, IntoReply, Json, Payload, Subscription, SubscriptionId, WeakChannel,
};
pub use shared::{BusError, HandlerError};
