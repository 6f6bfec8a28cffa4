//! Event registry -- topic-keyed subscriber table with ordered delivery.
//!
//! Process-lifetime state, mutated only by explicit subscribe/unsubscribe
//! calls. Reads vastly outnumber writes once traffic starts, so delivery
//! iterates over a snapshot taken under a read lock: a concurrent subscribe
//! can never corrupt an in-flight publish, and a handler may itself subscribe
//! without deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::dispatch::DispatchError;
use crate::message::CanonicalMessage;

/// Subscriber callback signature.
///
/// Handlers receive the canonical message by reference and report failure
/// through `anyhow`; whether a failure aborts the surrounding dispatch is the
/// driver's policy, not the registry's.
pub type Handler = Arc<dyn Fn(&CanonicalMessage) -> anyhow::Result<()> + Send + Sync>;

/// Handle identifying one `subscribe` call, usable for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// One subscriber as stored in a topic's invocation list.
#[derive(Clone)]
pub struct RegisteredHandler {
    id: SubscriberId,
    handler: Handler,
}

impl RegisteredHandler {
    /// The id of the `subscribe` call that registered this handler.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Invoke the handler with a message.
    pub fn call(&self, message: &CanonicalMessage) -> anyhow::Result<()> {
        (self.handler)(message)
    }
}

impl std::fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Multi-topic publish/subscribe table.
///
/// Insertion order per topic defines invocation order; later subscriptions
/// append, never replace.
#[derive(Debug, Default)]
pub struct EventRegistry {
    topics: RwLock<HashMap<String, Vec<RegisteredHandler>>>,
    next_id: AtomicU64,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one callback to every named topic atomically.
    ///
    /// All topics are updated under a single lock acquisition, so no publish
    /// can observe the subscription on one topic but not another. Returns a
    /// handle usable with [`EventRegistry::unsubscribe`].
    pub fn subscribe<I, S, F>(&self, topics: I, handler: F) -> SubscriberId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&CanonicalMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = RegisteredHandler {
            id,
            handler: Arc::new(handler),
        };
        let mut table = self.write_table();
        for topic in topics {
            let topic = topic.into();
            debug!(topic = %topic, subscriber = ?id, "subscribing");
            table.entry(topic).or_default().push(entry.clone());
        }
        id
    }

    /// Detach a previously-subscribed callback from every topic it was
    /// attached to. Returns whether anything was removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut table = self.write_table();
        let mut removed = false;
        for entries in table.values_mut() {
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            if entries.len() != before {
                removed = true;
            }
        }
        table.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.write_table().clear();
    }

    /// Number of handlers currently attached to a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read_table().get(topic).map_or(0, Vec::len)
    }

    /// Copy of a topic's invocation list, in insertion order.
    ///
    /// The snapshot is what delivery iterates over; registry mutations after
    /// the snapshot is taken do not affect an in-flight publish.
    pub fn snapshot(&self, topic: &str) -> Vec<RegisteredHandler> {
        self.read_table().get(topic).cloned().unwrap_or_default()
    }

    /// Invoke every handler for `topic` in insertion order.
    ///
    /// Returns the number of handlers invoked. A handler error propagates
    /// immediately -- the registry catches nothing; callers wanting isolation
    /// iterate a [`EventRegistry::snapshot`] themselves, as the dispatch
    /// driver does.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Handler`] for the first failing handler.
    pub fn publish(
        &self,
        topic: &str,
        message: &CanonicalMessage,
    ) -> Result<usize, DispatchError> {
        let snapshot = self.snapshot(topic);
        for entry in &snapshot {
            entry.call(message).map_err(|source| DispatchError::Handler {
                topic: topic.to_owned(),
                source,
            })?;
        }
        Ok(snapshot.len())
    }

    fn read_table(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<String, Vec<RegisteredHandler>>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<RegisteredHandler>>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }
}
