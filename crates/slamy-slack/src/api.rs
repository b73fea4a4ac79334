//! The upstream protocol seam.
//!
//! [`SlackApi`] has one method per Slack Web API call the client makes.
//! Every method takes the credential chosen by the dispatch policy and a
//! typed argument struct, and returns the method-specific response body
//! once `ok` has been checked. [`HttpSlackApi`](crate::http::HttpSlackApi)
//! is the production binding; tests substitute a recording mock.

use async_trait::async_trait;
use serde::Serialize;

use slamy_types::{Credential, Result};

use crate::types::{
    AuthTestResponse, ChatPostMessageResponse, ConversationInfoResponse, ConversationsPage,
    HistoryResponse, SearchResponse, UsersInfoResponse, UsersPage,
};

/// Conversation types requested when listing channels.
pub const CONVERSATION_TYPES: &str = "public_channel,private_channel";

/// Arguments for `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMessageArgs {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// Arguments for `chat.update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateMessageArgs {
    pub channel: String,
    pub ts: String,
    pub text: String,
}

/// Arguments for `chat.delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteMessageArgs {
    pub channel: String,
    pub ts: String,
}

/// Arguments for `reactions.add` and `reactions.remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionArgs {
    pub channel: String,
    /// Timestamp of the message being reacted to.
    pub timestamp: String,
    /// Emoji name without colons.
    pub name: String,
}

/// Arguments for the external file upload flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFileArgs {
    pub channel_id: String,
    pub filename: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Raw file contents.
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// Arguments for `users.conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersConversationsArgs {
    /// List conversations of this user (the caller when omitted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub types: String,
    pub exclude_archived: bool,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Arguments for `conversations.info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationInfoArgs {
    pub channel: String,
}

/// Arguments for `conversations.history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryArgs {
    pub channel: String,
    pub limit: usize,
    /// Only messages after this timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest: Option<String>,
}

/// Arguments for `conversations.replies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepliesArgs {
    pub channel: String,
    /// Timestamp of the thread's parent message.
    pub ts: String,
    pub limit: usize,
}

/// Arguments for `users.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersListArgs {
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Arguments for `users.info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersInfoArgs {
    pub user: String,
}

/// Arguments for `search.messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchArgs {
    pub query: String,
    pub sort: String,
    pub sort_dir: String,
    pub count: u32,
    pub page: u32,
}

/// A client for the subset of the Slack Web API used by slamy.
///
/// Implementations must map an `ok: false` response to
/// [`SlackError::Upstream`](slamy_types::SlackError::Upstream) carrying the
/// upstream error code verbatim.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `auth.test`
    async fn auth_test(&self, token: &Credential) -> Result<AuthTestResponse>;

    /// `chat.postMessage`
    async fn post_message(
        &self,
        token: &Credential,
        args: &PostMessageArgs,
    ) -> Result<ChatPostMessageResponse>;

    /// `chat.update`
    async fn update_message(&self, token: &Credential, args: &UpdateMessageArgs) -> Result<()>;

    /// `chat.delete`
    async fn delete_message(&self, token: &Credential, args: &DeleteMessageArgs) -> Result<()>;

    /// `reactions.add`
    async fn add_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()>;

    /// `reactions.remove`
    async fn remove_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()>;

    /// Upload a file and share it in a channel.
    async fn upload_file(&self, token: &Credential, args: &UploadFileArgs) -> Result<()>;

    /// `users.conversations` (one page)
    async fn users_conversations(
        &self,
        token: &Credential,
        args: &UsersConversationsArgs,
    ) -> Result<ConversationsPage>;

    /// `conversations.info`
    async fn conversation_info(
        &self,
        token: &Credential,
        args: &ConversationInfoArgs,
    ) -> Result<ConversationInfoResponse>;

    /// `conversations.history`
    async fn conversation_history(
        &self,
        token: &Credential,
        args: &HistoryArgs,
    ) -> Result<HistoryResponse>;

    /// `conversations.replies`
    async fn conversation_replies(
        &self,
        token: &Credential,
        args: &RepliesArgs,
    ) -> Result<HistoryResponse>;

    /// `users.list` (one page)
    async fn users_list(&self, token: &Credential, args: &UsersListArgs) -> Result<UsersPage>;

    /// `users.info`
    async fn users_info(&self, token: &Credential, args: &UsersInfoArgs)
    -> Result<UsersInfoResponse>;

    /// `search.messages`
    async fn search_messages(&self, token: &Credential, args: &SearchArgs)
    -> Result<SearchResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_args_omit_missing_thread() {
        let args = PostMessageArgs {
            channel: "C1".into(),
            text: "hi".into(),
            thread_ts: None,
        };
        let json = serde_json::to_value(&args).unwrap();
        assert!(json.get("thread_ts").is_none());
    }

    #[test]
    fn upload_args_never_serialize_content() {
        let args = UploadFileArgs {
            channel_id: "C1".into(),
            filename: "a.txt".into(),
            title: "a.txt".into(),
            thread_ts: None,
            content: b"secret bytes".to_vec(),
        };
        let json = serde_json::to_value(&args).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["filename"], "a.txt");
    }

    #[test]
    fn conversations_args_shape() {
        let args = UsersConversationsArgs {
            user: Some("U1".into()),
            types: CONVERSATION_TYPES.into(),
            exclude_archived: true,
            limit: 200,
            cursor: Some("abc".into()),
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["types"], "public_channel,private_channel");
        assert_eq!(json["exclude_archived"], true);
        assert_eq!(json["cursor"], "abc");
        assert_eq!(json["user"], "U1");
    }
}
