//! Best-effort product analytics.
//!
//! [`Telemetry`] is a cheap, cloneable handle. Events are pushed onto an
//! unbounded channel and a [`DeliveryWorker`] posts them to the PostHog
//! capture endpoint in the background, so callers never wait on the network
//! and never see delivery failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_HOST: &str = "https://eu.i.posthog.com";

/// Upper bound for one capture request; delivery is serial, so a hung
/// connection would otherwise hold up every later event.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub name: String,
    pub properties: Map<String, Value>,
}

impl TelemetryEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub write_key: Option<String>,
    pub host: Option<String>,
}

#[derive(Clone)]
pub struct Telemetry {
    sender: Option<UnboundedSender<TelemetryEvent>>,
    warned: Arc<AtomicBool>,
}

impl Telemetry {
    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            warned: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build the sink from config. The worker is `None` when no write key is
    /// set; otherwise it must be spawned for events to leave the process.
    pub fn new(config: &TelemetryConfig) -> (Self, Option<DeliveryWorker>) {
        let Some(write_key) = config.write_key.clone() else {
            return (Self::disabled(), None);
        };

        let host = config.host.as_deref().unwrap_or(DEFAULT_HOST);
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = DeliveryWorker {
            receiver,
            client: delivery_client(DELIVERY_TIMEOUT),
            endpoint: format!("{}/capture/", host.trim_end_matches('/')),
            write_key,
            distinct_id: Uuid::new_v4().to_string(),
        };

        let telemetry = Self {
            sender: Some(sender),
            warned: Arc::new(AtomicBool::new(false)),
        };
        (telemetry, Some(worker))
    }

    pub fn configured(&self) -> bool {
        self.sender.is_some()
    }

    pub fn capture(&self, event: TelemetryEvent) {
        match &self.sender {
            Some(sender) => {
                debug!(event = %event.name, "queueing telemetry event");
                // The worker only goes away at shutdown.
                let _ = sender.send(event);
            }
            None => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    warn!("Telemetry not initialized: POSTHOG_KEY not set");
                }
            }
        }
    }

    /// A configured sink whose events land in the returned receiver.
    #[cfg(test)]
    pub fn recording() -> (Self, UnboundedReceiver<TelemetryEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let telemetry = Self {
            sender: Some(sender),
            warned: Arc::new(AtomicBool::new(false)),
        };
        (telemetry, receiver)
    }
}

pub struct DeliveryWorker {
    receiver: UnboundedReceiver<TelemetryEvent>,
    client: Client,
    endpoint: String,
    write_key: String,
    distinct_id: String,
}

fn delivery_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

impl DeliveryWorker {
    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = delivery_client(timeout);
        self
    }

    /// Deliver events until every [`Telemetry`] handle has been dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            if let Err(e) = self.deliver(&event).await {
                warn!(event = %event.name, error = %e, "telemetry delivery failed");
            }
        }
        debug!("telemetry worker stopped");
    }

    async fn deliver(&self, event: &TelemetryEvent) -> reqwest::Result<()> {
        let mut properties = event.properties.clone();
        properties.insert("$lib".to_string(), json!("videopull"));
        // Anonymous events only; no person profiles.
        properties.insert("$process_person_profile".to_string(), json!(false));

        let payload = json!({
            "api_key": self.write_key,
            "event": event.name,
            "distinct_id": self.distinct_id,
            "properties": properties,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
