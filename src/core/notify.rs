//! Alert fan-out to subscribers
//!
//! Sends run concurrently up to `max_concurrent`. Each recipient is isolated:
//! a failure is logged and recorded in the report, never retried and never
//! propagated. A transport timeout holds its slot for `timeout_cooldown`
//! before the slot is reused.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::adapters::traits::MessageTransport;
use crate::core::types::{ArbitrageSignal, RecipientId, RenderedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutConfig {
    pub max_concurrent: usize,
    pub timeout_cooldown: Duration,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            timeout_cooldown: Duration::from_secs(3),
        }
    }
}

// =============================================================================
// Delivery Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    TimedOut,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub recipient: RecipientId,
    pub status: DeliveryStatus,
}

/// Per-recipient results of one fan-out round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Delivered))
    }

    pub fn timed_out(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::TimedOut))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Failed(_)))
    }

    pub fn status_for(&self, recipient: RecipientId) -> Option<&DeliveryStatus> {
        self.outcomes
            .iter()
            .find(|o| o.recipient == recipient)
            .map(|o| &o.status)
    }

    fn count(&self, pred: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

// =============================================================================
// NotificationFanout
// =============================================================================

pub struct NotificationFanout {
    transport: Arc<dyn MessageTransport>,
    config: FanoutConfig,
}

impl NotificationFanout {
    pub fn new(transport: Arc<dyn MessageTransport>, config: FanoutConfig) -> Self {
        Self {
            transport,
            config: FanoutConfig {
                max_concurrent: config.max_concurrent.max(1),
                ..config
            },
        }
    }

    /// Deliver `message` to every recipient; returns once every send finished.
    pub async fn notify(
        &self,
        signal: &ArbitrageSignal,
        message: &RenderedMessage,
        recipients: &[RecipientId],
    ) -> DeliveryReport {
        if recipients.is_empty() {
            warn!(symbol = %signal.spot_symbol, "[NOTIFY] No subscribers to notify");
            return DeliveryReport::default();
        }

        info!(
            symbol = %signal.spot_symbol,
            recipients = recipients.len(),
            "[NOTIFY] Fanning out signal"
        );

        let outcomes: Vec<DeliveryOutcome> = stream::iter(recipients.iter().copied())
            .map(|recipient| self.deliver(recipient, message))
            .buffer_unordered(self.config.max_concurrent)
            .collect()
            .await;

        let report = DeliveryReport { outcomes };
        info!(
            symbol = %signal.spot_symbol,
            delivered = report.delivered(),
            timed_out = report.timed_out(),
            failed = report.failed(),
            "[NOTIFY] Fan-out complete"
        );
        report
    }

    async fn deliver(&self, recipient: RecipientId, message: &RenderedMessage) -> DeliveryOutcome {
        let status = match self.transport.send(recipient, message).await {
            Ok(()) => {
                debug!(recipient, "[NOTIFY] Delivered");
                DeliveryStatus::Delivered
            }
            Err(e) if e.is_timeout() => {
                warn!(
                    recipient,
                    cooldown_secs = self.config.timeout_cooldown.as_secs(),
                    "[NOTIFY] Delivery timed out"
                );
                tokio::time::sleep(self.config.timeout_cooldown).await;
                DeliveryStatus::TimedOut
            }
            Err(e) => {
                warn!(recipient, error = %e, "[NOTIFY] Delivery failed");
                DeliveryStatus::Failed(e.to_string())
            }
        };

        DeliveryOutcome { recipient, status }
    }
}
