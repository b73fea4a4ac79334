//! # slamy-types
//!
//! Core type definitions for the slamy Slack client.
//!
//! Every other slamy crate depends on this one. It contains:
//!
//! - **[`error`]** -- [`SlackError`], the error type shared by the client
//!   and its transports
//! - **[`credential`]** -- [`Credential`] and [`CredentialScope`]
//! - **[`config`]** -- Configuration schema and token resolution
//! - **[`model`]** -- Result records returned by client operations

pub mod config;
pub mod credential;
pub mod error;
pub mod model;

pub use credential::{Credential, CredentialScope, TokenKind};
pub use error::{Result, SlackError};
