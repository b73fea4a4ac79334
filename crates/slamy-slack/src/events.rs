//! Socket Mode envelope and event types.
//!
//! Every frame Slack pushes over a Socket Mode WebSocket is a JSON object
//! with a `type`. Envelopes (`events_api`, `interactive`,
//! `slash_commands`) carry an `envelope_id` that must be echoed back in a
//! [`SlackAcknowledge`]; `hello` and `disconnect` frames do not.

use serde::{Deserialize, Serialize};

/// A Socket Mode envelope wrapping an event from Slack.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackEnvelope {
    /// `"events_api"`, `"interactive"` or `"slash_commands"`.
    #[serde(rename = "type")]
    pub envelope_type: String,

    /// Unique ID for this envelope; must be acknowledged.
    pub envelope_id: String,

    #[serde(default)]
    pub accepts_response_payload: bool,

    /// The event payload (for `events_api` envelopes).
    pub payload: Option<SlackEventPayload>,
}

impl SlackEnvelope {
    /// The inner event, if this is an `events_api` envelope carrying one.
    pub fn event(&self) -> Option<&SlackEvent> {
        if self.envelope_type != "events_api" {
            return None;
        }
        self.payload.as_ref().and_then(|p| p.event.as_ref())
    }
}

/// The payload inside an `events_api` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackEventPayload {
    pub team_id: Option<String>,

    /// The inner event object.
    pub event: Option<SlackEvent>,

    /// Top-level payload type (e.g. `"event_callback"`).
    #[serde(rename = "type")]
    pub payload_type: Option<String>,
}

/// An inner Slack event as delivered to subscribers.
///
/// Only the common message-shaped fields are modelled; any other event
/// type still arrives with its `event_type` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackEvent {
    /// `"message"`, `"app_mention"`, `"reaction_added"`, ...
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,

    /// Bot ID, if the message was sent by a bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    /// `"im"` for direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
}

/// Acknowledgement sent back to Slack over the WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct SlackAcknowledge {
    /// The envelope ID being acknowledged.
    pub envelope_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl SlackAcknowledge {
    /// Acknowledge an envelope without a response payload.
    pub fn for_envelope(envelope: &SlackEnvelope) -> Self {
        Self {
            envelope_id: envelope.envelope_id.clone(),
            payload: None,
        }
    }
}

/// Frame kinds that are not envelopes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlFrame {
    /// Sent once the connection is established.
    Hello {
        #[serde(default)]
        num_connections: Option<u32>,
    },
    /// Slack is about to close the connection (e.g. `"refresh_requested"`).
    Disconnect {
        #[serde(default)]
        reason: Option<String>,
    },
}
