//! Configuration types for the dispatcher and the outbound client.
//!
//! Plain serde-deserializable values with full defaults so a host can embed
//! them in its own config file. Components are constructed by passing a
//! config value in; there is no process-wide instance to mutate -- a host
//! that wants two differently-configured dispatchers builds two.

use serde::Deserialize;

// ── Dispatch ────────────────────────────────────────────────────

/// Dispatcher configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Which topics the classifier emits per recognized field.
    pub rules: TopicRules,
    /// What happens when a subscriber callback returns an error.
    pub on_handler_error: HandlerErrorPolicy,
}

/// Per-field classification rule set.
///
/// Defaults emit the wildcard topic plus each present field's specific value,
/// in fixed field order. Consumers that also want a broad category marker
/// (e.g. every slash command under one `"slash_command"` topic) enable it per
/// field via [`FieldRule::category`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopicRules {
    /// Rule for the top-level `type` field.
    pub message_type: FieldRule,
    /// Rule for `event.type` on realtime-event payloads.
    pub event: FieldRule,
    /// Rule for the `command` field on slash-command payloads.
    pub command: FieldRule,
    /// Rule for the `trigger_word` field on outgoing-webhook payloads.
    pub trigger_word: FieldRule,
    /// Rule for `payload.callback_id` on interactive-button payloads.
    pub callback_id: FieldRule,
}

/// Topics emitted for one recognized field, each toggle independent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    /// Emit the field's own value as a topic (on by default).
    pub specific: bool,
    /// Broad category topic emitted just before the specific value
    /// whenever the field is present (off by default).
    pub category: Option<String>,
}

impl Default for FieldRule {
    fn default() -> Self {
        Self {
            specific: true,
            category: None,
        }
    }
}

/// Policy for subscriber callbacks that return an error during dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerErrorPolicy {
    /// Log the failure and keep delivering to the remaining subscribers
    /// and topics (default).
    #[default]
    Isolate,
    /// Abort the dispatch on the first failing subscriber.
    FailFast,
}

// ── Outbound client ─────────────────────────────────────────────

/// Default base URL for the platform's Web API.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Outbound Web API client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Bearer token for API calls. Opaque pass-through; issuance is the
    /// host's concern.
    pub token: String,
    /// Base URL for named methods, overridable for tests and proxies.
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: DEFAULT_API_BASE.to_owned(),
        }
    }
}
