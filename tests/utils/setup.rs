use std::sync::Once;

use chanbus::{Bus, Channel, Payload};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

static TRACING: Once = Once::new();

/// Install a subscriber once per test binary; verbosity follows RUST_LOG
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "chanbus=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub struct TestSetup {
    pub bus: Bus,
    pub channel: Channel,
}

pub struct TestSetupBuilder {
    channel_name: String,
    with_greeter: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            channel_name: "users".to_string(),
            with_greeter: false,
        }
    }

    #[allow(dead_code)]
    pub fn with_channel(mut self, name: &str) -> Self {
        self.channel_name = name.to_string();
        self
    }

    /// Register a `greet` replier that answers `hi <name>`
    pub fn with_greeter(mut self) -> Self {
        self.with_greeter = true;
        self
    }

    pub fn build(self) -> TestSetup {
        init_tracing();

        let bus = Bus::new();
        let channel = bus.channel(&self.channel_name);

        if self.with_greeter {
            channel.reply("greet", |user: &Payload| {
                format!("hi {}", user["name"].as_str().unwrap_or("stranger"))
            });
        }

        TestSetup { bus, channel }
    }
}
