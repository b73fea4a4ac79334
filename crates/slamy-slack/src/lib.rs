//! Slack client for slamy.
//!
//! Outbound text is repaired ([`mrkdwn`]) and split into message-sized
//! chunks ([`split`]); every call is routed to the bot or user token by
//! the [`dispatch`] policy; [`SlackClient`] composes these over the
//! [`SlackApi`] protocol seam.
//!
//! # Architecture
//!
//! ```text
//! caller ──> SlackClient ──fix_mrkdwn──> split_message ──> chunks
//!                 │                                          │
//!          CredentialStore::resolve(scope_for(op))           │
//!                 │                                          │
//!                 └──────────> Arc<dyn SlackApi> <───────────┘
//!                                     │
//!                               HttpSlackApi (reqwest)
//!
//! EventSubscriber ──apps.connections.open──> WebSocket ──> handlers
//! ```
//!
//! # Modules
//!
//! - [`split`] -- paragraph/line aware message chunking
//! - [`mrkdwn`] -- bold-markup repair
//! - [`dispatch`] -- operation to credential routing
//! - [`api`] -- the `SlackApi` trait and its argument types
//! - [`http`] -- `SlackApi` over the Slack Web API
//! - [`client`] -- the `SlackClient` façade
//! - [`upload`] -- upload sources
//! - [`events`] / [`socket`] -- Socket Mode event subscription

pub mod api;
pub mod client;
pub mod dispatch;
pub mod events;
pub mod http;
pub mod mrkdwn;
pub mod socket;
pub mod split;
pub mod types;
pub mod upload;

pub use api::SlackApi;
pub use client::{SearchOptions, SlackClient};
pub use dispatch::{CredentialStore, Operation, scope_for};
pub use http::HttpSlackApi;
pub use mrkdwn::fix_mrkdwn;
pub use socket::EventSubscriber;
pub use split::{MAX_MESSAGE_LENGTH, split_message};
pub use upload::{UploadOptions, UploadSource};

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
