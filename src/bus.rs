use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::channel::Channel;

/// Registry of named channels
///
/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct Bus {
    /// channel name -> channel
    channels: Arc<RwLock<HashMap<String, Channel>>>,
}

impl Bus {
    /// Creates a bus with no channels
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the channel called `name`, creating it on first use.
    ///
    /// Every call with the same name returns the same instance.
    pub fn channel(&self, name: &str) -> Channel {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(channel) = channels.get(name) {
            return channel.clone();
        }
        drop(channels);

        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(channel = %name, "Creating new channel");
                Channel::new(name)
            })
            .clone()
    }

    /// Whether a channel called `name` has been created
    pub fn has_channel(&self, name: &str) -> bool {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels.contains_key(name)
    }

    /// Names of all created channels, sorted
    pub fn channel_names(&self) -> Vec<String> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = channels.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
