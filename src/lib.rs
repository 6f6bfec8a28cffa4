//! Slackwire -- a minimal adapter between a host application and a
//! Slack-style chat platform.
//!
//! The crate normalizes the platform's three inbound wire formats (JSON
//! object, JSON text, URL-encoded form) into one [`CanonicalMessage`],
//! classifies each message into an ordered topic set, and fans it out to
//! subscribers held in an [`EventRegistry`]. Transports stay outside: an
//! HTTP listener or realtime-socket client hands raw payloads to
//! [`Dispatcher::dispatch`] and uses the returned message for its response
//! decisions (e.g. echoing the verification `challenge`). Outbound, a thin
//! [`ApiClient`] posts to named Web API methods.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod message;
pub mod registry;

pub use classify::{classify, WILDCARD_TOPIC};
pub use client::{ApiClient, ClientError};
pub use config::{ClientConfig, DispatchConfig, FieldRule, HandlerErrorPolicy, TopicRules};
pub use decode::{decode, DecodeError, RawPayload};
pub use dispatch::{DispatchError, Dispatcher};
pub use message::CanonicalMessage;
pub use registry::{EventRegistry, RegisteredHandler, SubscriberId};
