//! Result records returned by client operations.
//!
//! These are the client's own shapes, independent of the Slack wire
//! format. Missing upstream fields are defaulted when they are built
//! (empty strings, zero, `false`), so every field here is always present
//! except the explicitly optional ones. All records serialize with
//! `snake_case` keys for JSON output.

use serde::{Deserialize, Serialize};

/// Identifies a message that was posted, replied, or updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    /// Channel the message lives in.
    pub channel: String,
    /// Timestamp (message ID) of the first chunk, or of the edited message.
    pub ts: String,
}

/// A conversation the caller is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub purpose: String,
    pub num_members: u64,
    pub is_private: bool,
    pub is_archived: bool,
}

/// A channel with messages newer than the caller's read marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadChannel {
    #[serde(flatten)]
    pub channel: ChannelInfo,
    /// Number of unread messages (capped at one page of history).
    pub unread_count: u64,
}

/// A message from channel history or a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,
    pub user: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
}

/// A workspace member, as listed by `users list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub real_name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_bot: bool,
    pub deleted: bool,
}

/// Detailed profile of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub real_name: String,
    pub display_name: String,
    pub email: String,
    pub title: String,
    pub phone: String,
    pub status_text: String,
    pub status_emoji: String,
    pub tz: String,
    pub is_admin: bool,
    pub is_bot: bool,
    pub deleted: bool,
}

/// One page of message search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    pub total: u64,
    pub page: u64,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub ts: String,
    /// Channel name.
    pub channel: String,
    pub channel_id: String,
    pub user: String,
    pub text: String,
    pub permalink: String,
}

/// Identity behind the credential used for the identity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub user_id: String,
    pub user: String,
    pub team_id: String,
    pub team: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_channel_flattens_channel_fields() {
        let unread = UnreadChannel {
            channel: ChannelInfo {
                id: "C1".into(),
                name: "general".into(),
                topic: String::new(),
                purpose: String::new(),
                num_members: 3,
                is_private: false,
                is_archived: false,
            },
            unread_count: 4,
        };
        let json = serde_json::to_value(&unread).unwrap();
        assert_eq!(json["id"], "C1");
        assert_eq!(json["name"], "general");
        assert_eq!(json["unread_count"], 4);
        assert!(json.get("channel").is_none());
    }

    #[test]
    fn message_omits_absent_thread_fields() {
        let msg = Message {
            ts: "1.0".into(),
            user: "U1".into(),
            text: "hi".into(),
            thread_ts: None,
            reply_count: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("thread_ts").is_none());
        assert!(json.get("reply_count").is_none());
    }

    #[test]
    fn user_email_optional() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "U1",
            "name": "alice",
            "real_name": "Alice",
            "display_name": "al",
            "is_bot": false,
            "deleted": false
        }))
        .unwrap();
        assert!(user.email.is_none());
    }
}
