// Channel: one named scope with its own event and request handlers
//
// Events fan out to every subscriber; requests are answered by a single replier.

// Public API - what other modules can use
pub use handle::{Channel, WeakChannel};
pub use handler::{IntoReply, Json, Payload};
pub use subscription::{Subscription, SubscriptionId};

// Internal modules
mod handle;
mod handler;
mod registry;
mod subscription;
