use thiserror::Error;

/// Anything a handler raises. The bus never inspects it.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by channel operations
#[derive(Error, Debug)]
pub enum BusError {
    /// `request` was called for a name nobody replies to
    #[error("No handler registered for request \"{request}\" on channel \"{channel}\"")]
    NoHandler { channel: String, request: String },

    /// A user handler returned an error
    #[error("Handler for \"{name}\" on channel \"{channel}\" failed: {source}")]
    Handler {
        channel: String,
        name: String,
        #[source]
        source: HandlerError,
    },

    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl BusError {
    /// Whether this is the unhandled-request error rather than a handler failure
    pub fn is_unhandled(&self) -> bool {
        matches!(self, BusError::NoHandler { .. })
    }

    /// The request name, when this is the unhandled-request error
    pub fn request_name(&self) -> Option<&str> {
        match self {
            BusError::NoHandler { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Recover the error a handler raised, if that is what this is
    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            BusError::Handler { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn no_handler(channel: &str, request: &str) -> Self {
        BusError::NoHandler {
            channel: channel.to_string(),
            request: request.to_string(),
        }
    }

    pub(crate) fn handler(channel: &str, name: &str, source: HandlerError) -> Self {
        BusError::Handler {
            channel: channel.to_string(),
            name: name.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_handler_names_the_request() {
        let err = BusError::no_handler("users", "greet");

        assert!(err.is_unhandled());
        assert_eq!(err.request_name(), Some("greet"));
        assert_eq!(
            err.to_string(),
            "No handler registered for request \"greet\" on channel \"users\""
        );
    }

    #[test]
    fn test_handler_error_keeps_its_source() {
        let err = BusError::handler("users", "greet", "boom".into());

        assert!(!err.is_unhandled());
        assert_eq!(err.request_name(), None);
        assert!(err.to_string().ends_with("failed: boom"));

        let source = err.into_handler_error().expect("handler error should be recoverable");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn test_payload_error_is_not_a_handler_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = BusError::from(json_err);

        assert!(!err.is_unhandled());
        assert!(err.into_handler_error().is_none());
    }
}
