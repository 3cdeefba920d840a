//! In-process collaborators
//!
//! `MemorySignalStore` keeps the newest signals in a bounded buffer (dry runs, tests).
//! `StaticSubscriberRegistry` serves a fixed recipient list from config.
//! `LogOnlyTransport` writes alerts to the log when no bot token is set.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::adapters::errors::{DeliveryError, StoreError};
use crate::adapters::traits::{MessageTransport, SignalStore, SubscriberRegistry};
use crate::core::types::{ArbitrageSignal, RecipientId, RenderedMessage};

/// Signals kept by `MemorySignalStore::new`
pub const DEFAULT_MEMORY_CAPACITY: usize = 1_000;

/// Keeps at most `capacity` signals; the oldest is dropped first.
#[derive(Debug)]
pub struct MemorySignalStore {
    signals: RwLock<VecDeque<ArbitrageSignal>>,
    capacity: usize,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// A capacity of 0 is raised to 1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            signals: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_MEMORY_CAPACITY))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained signals, oldest first
    pub async fn signals(&self) -> Vec<ArbitrageSignal> {
        self.signals.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.signals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.signals.read().await.is_empty()
    }
}

impl Default for MemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn save(&self, signal: &ArbitrageSignal) -> Result<(), StoreError> {
        let mut signals = self.signals.write().await;
        if signals.len() == self.capacity {
            signals.pop_front();
        }
        signals.push_back(signal.clone());
        debug!(symbol = %signal.spot_symbol, retained = signals.len(), "Signal kept in memory");
        Ok(())
    }
}

/// Recipients whose membership can be changed between rounds
#[derive(Debug, Default)]
pub struct StaticSubscriberRegistry {
    recipients: RwLock<Vec<RecipientId>>,
}

impl StaticSubscriberRegistry {
    pub fn new(recipients: Vec<RecipientId>) -> Self {
        Self {
            recipients: RwLock::new(recipients),
        }
    }

    pub async fn subscribe(&self, recipient: RecipientId) {
        let mut recipients = self.recipients.write().await;
        if !recipients.contains(&recipient) {
            recipients.push(recipient);
        }
    }

    pub async fn unsubscribe(&self, recipient: RecipientId) {
        self.recipients.write().await.retain(|r| *r != recipient);
    }
}

#[async_trait]
impl SubscriberRegistry for StaticSubscriberRegistry {
    async fn list(&self) -> Result<Vec<RecipientId>, StoreError> {
        Ok(self.recipients.read().await.clone())
    }
}

#[derive(Debug, Default)]
pub struct LogOnlyTransport;

#[async_trait]
impl MessageTransport for LogOnlyTransport {
    async fn send(&self, recipient: RecipientId, message: &RenderedMessage) -> Result<(), DeliveryError> {
        info!(
            recipient,
            chars = message.text.chars().count(),
            links = message.links.iter().map(Vec::len).sum::<usize>(),
            "[NOTIFY] Alert logged (no transport configured)"
        );
        Ok(())
    }
}
