//! Slack Web API wire types.
//!
//! Slack responses are flat JSON objects carrying `ok`, an optional
//! `error`, and method-specific fields. [`SlackResponse`] captures the
//! common part and flattens the method body into `data`. Every body field
//! is optional or defaulted: Slack omits fields freely, and the client
//! fills in its own defaults when building result records.

use serde::{Deserialize, Serialize};

/// Common Slack Web API response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackResponse<T> {
    /// Whether the API call succeeded.
    pub ok: bool,

    /// Error code if `ok` is `false` (e.g. `"channel_not_found"`).
    #[serde(default)]
    pub error: Option<String>,

    /// Method-specific body.
    #[serde(flatten)]
    pub data: T,
}

/// Body with no fields of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Empty {}

/// Response from `auth.test`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthTestResponse {
    pub user_id: Option<String>,
    pub user: Option<String>,
    pub team_id: Option<String>,
    pub team: Option<String>,
    pub url: Option<String>,
}

/// Response from `chat.postMessage`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatPostMessageResponse {
    /// Channel where the message was posted.
    pub channel: Option<String>,
    /// Timestamp of the posted message.
    pub ts: Option<String>,
}

/// Cursor metadata attached to paginated responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponseMetadata {
    pub next_cursor: Option<String>,
}

impl ResponseMetadata {
    /// The next cursor, or `None` when the listing is exhausted.
    pub fn cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// A `{ "value": ... }` text field (channel topic and purpose).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextValue {
    pub value: Option<String>,
}

/// A conversation object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: String,
    pub name: Option<String>,
    pub topic: Option<TextValue>,
    pub purpose: Option<TextValue>,
    pub num_members: Option<u64>,
    pub is_private: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_member: Option<bool>,
    /// Timestamp of the caller's read marker (only from `conversations.info`).
    pub last_read: Option<String>,
}

/// Response from `users.conversations`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationsPage {
    pub channels: Vec<Conversation>,
    pub response_metadata: Option<ResponseMetadata>,
}

impl ConversationsPage {
    /// The next cursor, if there are more pages.
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata.as_ref().and_then(ResponseMetadata::cursor)
    }
}

/// Response from `conversations.info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationInfoResponse {
    pub channel: Option<Conversation>,
}

/// A message object as returned by history and replies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireMessage {
    pub ts: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub thread_ts: Option<String>,
    pub reply_count: Option<u64>,
}

/// Response from `conversations.history` and `conversations.replies`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryResponse {
    pub messages: Vec<WireMessage>,
    pub has_more: Option<bool>,
    pub response_metadata: Option<ResponseMetadata>,
}

/// The `profile` sub-object of a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub status_text: Option<String>,
    pub status_emoji: Option<String>,
}

/// A user object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireUser {
    pub id: String,
    pub name: Option<String>,
    pub real_name: Option<String>,
    pub tz: Option<String>,
    pub is_admin: Option<bool>,
    pub is_bot: Option<bool>,
    pub deleted: Option<bool>,
    pub profile: Option<WireProfile>,
}

/// Response from `users.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsersPage {
    pub members: Vec<WireUser>,
    pub response_metadata: Option<ResponseMetadata>,
}

impl UsersPage {
    /// The next cursor, if there are more pages.
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata.as_ref().and_then(ResponseMetadata::cursor)
    }
}

/// Response from `users.info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UsersInfoResponse {
    pub user: Option<WireUser>,
}

/// Channel reference inside a search match.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchChannel {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single search hit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireSearchMatch {
    pub ts: Option<String>,
    pub channel: Option<SearchChannel>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub permalink: Option<String>,
}

/// Paging block of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub page: Option<u64>,
    pub pages: Option<u64>,
}

/// The `messages` block of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchMessages {
    pub matches: Vec<WireSearchMatch>,
    pub total: Option<u64>,
    pub paging: Option<Paging>,
}

/// Response from `search.messages`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub messages: Option<SearchMessages>,
}

/// Response from `files.getUploadURLExternal`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadUrlResponse {
    pub upload_url: Option<String>,
    pub file_id: Option<String>,
}

/// Response from `apps.connections.open`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionsOpenResponse {
    /// The WebSocket URL to connect to.
    pub url: Option<String>,
}
