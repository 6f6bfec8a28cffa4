//! Dispatch driver -- ties decoder, classifier, and registry together.
//!
//! The single entry point transports invoke per inbound payload: decode it,
//! classify it into topics, publish to every topic in order, and hand the
//! decoded message back so the transport can make its response decision
//! (e.g. echoing a verification challenge).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::config::{DispatchConfig, HandlerErrorPolicy};
use crate::decode::{decode, DecodeError, RawPayload};
use crate::message::CanonicalMessage;
use crate::registry::{EventRegistry, SubscriberId};

/// Errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The inbound payload failed to decode (corrupt nested `payload`).
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A subscriber callback failed under the fail-fast policy.
    #[error("handler failed for topic {topic:?}: {source}")]
    Handler {
        /// Topic being delivered when the handler failed.
        topic: String,
        /// The handler's error.
        #[source]
        source: anyhow::Error,
    },
}

/// Dispatch driver owning the classification rules and an [`EventRegistry`].
///
/// Each dispatcher is a fresh, independently-configured value; hosts wanting
/// different rule sets construct separate dispatchers, optionally sharing one
/// registry via [`Dispatcher::with_registry`].
pub struct Dispatcher {
    registry: Arc<EventRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with its own empty registry.
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_registry(config, Arc::new(EventRegistry::new()))
    }

    /// Create a dispatcher over an existing (possibly shared) registry.
    pub fn with_registry(config: DispatchConfig, registry: Arc<EventRegistry>) -> Self {
        Self { registry, config }
    }

    /// The underlying registry, shareable with the host.
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Attach one callback to every named topic. Delegates to the registry.
    pub fn subscribe<I, S, F>(&self, topics: I, handler: F) -> SubscriberId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&CanonicalMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.subscribe(topics, handler)
    }

    /// Decode a raw payload, classify it, and publish to every topic.
    ///
    /// Topics are published strictly in classification order and, within a
    /// topic, subscribers fire in registration order. Safe to call
    /// concurrently for independent payloads; delivery iterates registry
    /// snapshots, so concurrent subscribes never corrupt it.
    ///
    /// Returns the decoded message for the transport's response decision.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Decode`] for a corrupt nested `payload` field, and
    /// [`DispatchError::Handler`] for a failing subscriber when the policy is
    /// [`HandlerErrorPolicy::FailFast`]. Under the default
    /// [`HandlerErrorPolicy::Isolate`], handler failures are logged and
    /// delivery continues.
    pub fn dispatch(&self, raw: impl Into<RawPayload>) -> Result<CanonicalMessage, DispatchError> {
        let message = decode(raw)?;
        let topics = classify(&message, &self.config.rules);
        debug!(topics = ?topics, "dispatching inbound message");

        for topic in &topics {
            for entry in self.registry.snapshot(topic) {
                if let Err(source) = entry.call(&message) {
                    match self.config.on_handler_error {
                        HandlerErrorPolicy::Isolate => {
                            warn!(
                                error = %source,
                                topic = %topic,
                                subscriber = ?entry.id(),
                                "handler failed, continuing delivery"
                            );
                        }
                        HandlerErrorPolicy::FailFast => {
                            return Err(DispatchError::Handler {
                                topic: topic.clone(),
                                source,
                            });
                        }
                    }
                }
            }
        }

        Ok(message)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}
