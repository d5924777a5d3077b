use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::embeds::Embed;
use crate::events::{
    default_dispatcher, EventContext, EventDispatcher, GatewayEnvelope, GatewayEvent,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// Failure of an outbound platform call. `Forbidden` means the bot itself
/// lacks the platform capability (distinct from a caller failing the access
/// gate); everything else carries the platform's description verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("missing platform permission")]
    Forbidden,
    #[error("{0}")]
    Failure(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadRef {
    pub id: String,
    pub name: String,
}

impl ThreadRef {
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// Outbound seam to the chat platform: message sends and thread lifecycle
/// calls. Interaction replies do not pass through here; they are returned to
/// the substrate alongside the acknowledged envelope.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn create_thread(
        &self,
        parent_channel_id: &str,
        name: &str,
        auto_archive_minutes: u32,
    ) -> Result<ThreadRef, PlatformError>;

    async fn send_message(&self, channel_id: &str, embed: &Embed) -> Result<(), PlatformError>;

    async fn archive_thread(&self, thread_id: &str) -> Result<(), PlatformError>;

    async fn delete_thread(&self, thread_id: &str) -> Result<(), PlatformError>;
}

#[derive(Default)]
pub struct NoopPlatformClient;

#[async_trait]
impl PlatformClient for NoopPlatformClient {
    async fn create_thread(
        &self,
        _parent_channel_id: &str,
        name: &str,
        _auto_archive_minutes: u32,
    ) -> Result<ThreadRef, PlatformError> {
        Ok(ThreadRef { id: format!("noop-{name}"), name: name.to_owned() })
    }

    async fn send_message(&self, _channel_id: &str, _embed: &Embed) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn archive_thread(&self, _thread_id: &str) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn delete_thread(&self, _thread_id: &str) -> Result<(), PlatformError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Inbound seam to the chat platform: a stream of interaction envelopes that
/// must be acknowledged after receipt.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_envelope(&self) -> Result<Option<GatewayEnvelope>, TransportError>;
    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopChatTransport;

#[async_trait]
impl ChatTransport for NoopChatTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<GatewayEnvelope>, TransportError> {
        Ok(None)
    }

    async fn acknowledge(&self, _envelope_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

pub struct GatewayRunner {
    transport: Arc<dyn ChatTransport>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
    noop_transport: bool,
}

impl Default for GatewayRunner {
    fn default() -> Self {
        Self {
            transport: Arc::new(NoopChatTransport),
            dispatcher: default_dispatcher(),
            reconnect_policy: ReconnectPolicy::default(),
            noop_transport: true,
        }
    }
}

impl GatewayRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, dispatcher, reconnect_policy, noop_transport: false }
    }

    /// Runner over the no-op transport with a caller-supplied handler set.
    pub fn with_dispatcher(dispatcher: EventDispatcher) -> Self {
        Self { dispatcher, ..Self::default() }
    }

    pub fn is_noop_transport(&self) -> bool {
        self.noop_transport
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "gateway transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "gateway retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening gateway transport connection");
        self.transport.connect().await?;
        info!(attempt, "gateway transport connected");

        loop {
            let Some(envelope) = self.transport.next_envelope().await? else {
                info!(attempt, "gateway transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };
            let (command, channel) = correlation_fields(&envelope);

            info!(
                event_name = "ingress.gateway.envelope_received",
                envelope_id = %envelope.envelope_id,
                event_type = ?envelope.event.event_type(),
                correlation_id = %envelope.envelope_id,
                command = command.as_deref().unwrap_or("unknown"),
                channel = channel.as_deref().unwrap_or("unknown"),
                "received gateway envelope"
            );

            if let Err(error) = self.transport.acknowledge(&envelope.envelope_id).await {
                warn!(
                    event_name = "ingress.gateway.ack_sent",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    command = command.as_deref().unwrap_or("unknown"),
                    channel = channel.as_deref().unwrap_or("unknown"),
                    error = %error,
                    "failed to acknowledge gateway envelope"
                );
            } else {
                debug!(
                    event_name = "ingress.gateway.ack_sent",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    command = command.as_deref().unwrap_or("unknown"),
                    channel = channel.as_deref().unwrap_or("unknown"),
                    "acknowledged gateway envelope"
                );
            }

            let context = EventContext { correlation_id: envelope.envelope_id.clone() };
            if let Err(error) = self.dispatcher.dispatch(&envelope, &context).await {
                warn!(
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    command = command.as_deref().unwrap_or("unknown"),
                    channel = channel.as_deref().unwrap_or("unknown"),
                    error = %error,
                    "event dispatch failed; continuing gateway loop"
                );
            }
        }
    }
}

fn correlation_fields(envelope: &GatewayEnvelope) -> (Option<String>, Option<String>) {
    match &envelope.event {
        GatewayEvent::CommandInvocation(payload) => {
            (Some(payload.command.clone()), Some(payload.channel.name.clone()))
        }
        GatewayEvent::Unsupported { .. } => (None, None),
    }
}
