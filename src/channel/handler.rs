use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::shared::HandlerError;

/// Payload carried by events, requests and replies.
///
/// An absent payload is `Value::Null`.
pub type Payload = Value;

/// Type-erased handler as stored in a channel registry
pub(crate) type Handler = Arc<dyn Fn(&Payload) -> Result<Payload, HandlerError> + Send + Sync>;

/// Conversion from whatever a handler returns into a reply.
///
/// Event handlers go through the same conversion, but only the error side
/// matters there: a successful value is dropped.
///
/// Primitives, `String`, `&'static str` and `Value` convert directly; wrap any
/// other serializable type in [`Json`].
///
/// Returning `Err` is how a handler fails:
///
/// ```rust,ignore
/// channel.reply("load", |payload| -> Result<Json<User>, HandlerError> {
///     let id = payload["id"].as_u64().ok_or("missing id")?;
///     Ok(Json(users.find(id)?))
/// });
/// ```
pub trait IntoReply {
    fn into_reply(self) -> Result<Payload, HandlerError>;
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Payload, HandlerError> {
        Ok(Value::Null)
    }
}

macro_rules! impl_into_reply_via_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> Result<Payload, HandlerError> {
                    Ok(Value::from(self))
                }
            }
        )*
    };
}

// Every primitive `serde_json::Value` converts from; anything else goes through `Json`
impl_into_reply_via_value!(
    Value,
    String,
    &'static str,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Payload, HandlerError> {
        match self {
            Some(value) => value.into_reply(),
            None => Ok(Value::Null),
        }
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HandlerError>,
{
    fn into_reply(self) -> Result<Payload, HandlerError> {
        self.map_err(Into::into).and_then(IntoReply::into_reply)
    }
}

/// Reply with any serializable value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Payload, HandlerError> {
        serde_json::to_value(self.0).map_err(Into::into)
    }
}

/// Erase a user closure into the stored handler form
pub(crate) fn into_handler<F, R>(handler: F) -> Handler
where
    F: Fn(&Payload) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    Arc::new(move |payload: &Payload| handler(payload).into_reply())
}
