use std::sync::{Arc, Mutex};

use chanbus::Payload;

// ============================================================================
// Recording Handlers
// ============================================================================

/// Shared log that handlers append to, tagged by who saw what
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that records the payload's `name` field
    pub fn names(&self) -> impl Fn(&Payload) + Send + Sync + 'static {
        let entries = self.entries.clone();
        move |payload: &Payload| {
            let name = payload["name"].as_str().unwrap_or("?").to_string();
            entries.lock().unwrap().push(name);
        }
    }

    /// Handler that records `<tag>:<payload>`
    pub fn tagged(&self, tag: &'static str) -> impl Fn(&Payload) + Send + Sync + 'static {
        let entries = self.entries.clone();
        move |payload: &Payload| {
            entries.lock().unwrap().push(format!("{tag}:{payload}"));
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
