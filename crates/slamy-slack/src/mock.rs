//! Recording in-memory [`SlackApi`] for tests.
//!
//! Compiled for this crate's unit tests and, with the `test-utils` feature,
//! for downstream crates that drive a [`SlackClient`](crate::SlackClient)
//! without a network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use slamy_types::{Credential, Result, SlackError};

use crate::api::{
    ConversationInfoArgs, DeleteMessageArgs, HistoryArgs, PostMessageArgs, ReactionArgs,
    RepliesArgs, SearchArgs, SlackApi, UpdateMessageArgs, UploadFileArgs, UsersConversationsArgs,
    UsersInfoArgs, UsersListArgs,
};
use crate::client::compare_ts;
use crate::types::{
    AuthTestResponse, ChatPostMessageResponse, Conversation, ConversationInfoResponse,
    ConversationsPage, HistoryResponse, ResponseMetadata, SearchResponse, UsersInfoResponse,
    UsersPage, WireMessage, WireUser,
};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub token: String,
    pub args: serde_json::Value,
}

#[derive(Default)]
pub struct MockSlackApi {
    calls: Mutex<Vec<Call>>,
    uploads: Mutex<Vec<UploadFileArgs>>,
    /// method -> upstream error code
    failures: HashMap<&'static str, String>,
    /// method -> (successful calls allowed, upstream error code)
    failures_after: HashMap<&'static str, (usize, String)>,
    /// (method, channel) pairs that fail with `"internal_error"`
    channel_failures: HashSet<(&'static str, String)>,
    auth: AuthTestResponse,
    conversation_pages: Vec<Vec<Conversation>>,
    conversations: HashMap<String, Conversation>,
    histories: HashMap<String, Vec<WireMessage>>,
    replies: Vec<WireMessage>,
    user_pages: Vec<Vec<WireUser>>,
    user: Option<WireUser>,
    search: SearchResponse,
}

impl MockSlackApi {
    pub fn new() -> Self {
        Self {
            auth: AuthTestResponse {
                user_id: Some("U_SELF".into()),
                user: Some("slamy".into()),
                team_id: Some("T1".into()),
                team: Some("Acme".into()),
                url: Some("https://acme.slack.com/".into()),
            },
            ..Self::default()
        }
    }

    pub fn failing(mut self, method: &'static str, error: &str) -> Self {
        self.failures.insert(method, error.to_owned());
        self
    }

    /// Let the first `successes` calls to `method` succeed, fail the rest.
    pub fn failing_after(mut self, method: &'static str, successes: usize, error: &str) -> Self {
        self.failures_after.insert(method, (successes, error.to_owned()));
        self
    }

    pub fn failing_for_channel(mut self, method: &'static str, channel: &str) -> Self {
        self.channel_failures.insert((method, channel.to_owned()));
        self
    }

    pub fn with_auth(mut self, auth: AuthTestResponse) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_conversation_pages(mut self, pages: Vec<Vec<Conversation>>) -> Self {
        self.conversation_pages = pages;
        self
    }

    pub fn with_conversation_info(mut self, info: Conversation) -> Self {
        self.conversations.insert(info.id.clone(), info);
        self
    }

    /// Messages of a channel, newest first.
    pub fn with_history(mut self, channel: &str, messages: Vec<WireMessage>) -> Self {
        self.histories.insert(channel.to_owned(), messages);
        self
    }

    pub fn with_replies(mut self, messages: Vec<WireMessage>) -> Self {
        self.replies = messages;
        self
    }

    pub fn with_user_pages(mut self, pages: Vec<Vec<WireUser>>) -> Self {
        self.user_pages = pages;
        self
    }

    pub fn with_user(mut self, user: WireUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_search(mut self, search: SearchResponse) -> Self {
        self.search = search;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    pub fn uploads(&self) -> Vec<UploadFileArgs> {
        self.uploads.lock().unwrap().clone()
    }

    fn record<A: Serialize>(
        &self,
        method: &'static str,
        token: &Credential,
        args: &A,
    ) -> Result<()> {
        let args = serde_json::to_value(args).unwrap_or_default();
        let channel = args
            .get("channel")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_owned();
        let attempts = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                method,
                token: token.expose().to_owned(),
                args,
            });
            calls.iter().filter(|c| c.method == method).count()
        };

        if let Some(error) = self.failures.get(method) {
            return Err(SlackError::upstream(method, error.clone()));
        }
        if let Some((successes, error)) = self.failures_after.get(method)
            && attempts > *successes
        {
            return Err(SlackError::upstream(method, error.clone()));
        }
        if self.channel_failures.contains(&(method, channel)) {
            return Err(SlackError::upstream(method, "internal_error"));
        }
        Ok(())
    }

    fn posted_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == "chat.postMessage")
            .count()
    }
}

fn page_index(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|c| c.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn metadata(index: usize, pages: usize) -> Option<ResponseMetadata> {
    let next_cursor = if index + 1 < pages {
        format!("page-{}", index + 1)
    } else {
        String::new()
    };
    Some(ResponseMetadata {
        next_cursor: Some(next_cursor),
    })
}

#[derive(Serialize)]
struct NoArgs {}

#[async_trait]
impl SlackApi for MockSlackApi {
    async fn auth_test(&self, token: &Credential) -> Result<AuthTestResponse> {
        self.record("auth.test", token, &NoArgs {})?;
        Ok(self.auth.clone())
    }

    async fn post_message(
        &self,
        token: &Credential,
        args: &PostMessageArgs,
    ) -> Result<ChatPostMessageResponse> {
        self.record("chat.postMessage", token, args)?;
        let n = self.posted_count();
        Ok(ChatPostMessageResponse {
            channel: Some(args.channel.clone()),
            ts: Some(format!("1700000000.{n:06}")),
        })
    }

    async fn update_message(&self, token: &Credential, args: &UpdateMessageArgs) -> Result<()> {
        self.record("chat.update", token, args)
    }

    async fn delete_message(&self, token: &Credential, args: &DeleteMessageArgs) -> Result<()> {
        self.record("chat.delete", token, args)
    }

    async fn add_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()> {
        self.record("reactions.add", token, args)
    }

    async fn remove_reaction(&self, token: &Credential, args: &ReactionArgs) -> Result<()> {
        self.record("reactions.remove", token, args)
    }

    async fn upload_file(&self, token: &Credential, args: &UploadFileArgs) -> Result<()> {
        self.record("files.upload", token, args)?;
        self.uploads.lock().unwrap().push(args.clone());
        Ok(())
    }

    async fn users_conversations(
        &self,
        token: &Credential,
        args: &UsersConversationsArgs,
    ) -> Result<ConversationsPage> {
        self.record("users.conversations", token, args)?;
        let index = page_index(args.cursor.as_deref());
        Ok(ConversationsPage {
            channels: self
                .conversation_pages
                .get(index)
                .cloned()
                .unwrap_or_default(),
            response_metadata: metadata(index, self.conversation_pages.len()),
        })
    }

    async fn conversation_info(
        &self,
        token: &Credential,
        args: &ConversationInfoArgs,
    ) -> Result<ConversationInfoResponse> {
        self.record("conversations.info", token, args)?;
        match self.conversations.get(&args.channel) {
            Some(channel) => Ok(ConversationInfoResponse {
                channel: Some(channel.clone()),
            }),
            None => Err(SlackError::upstream("conversations.info", "channel_not_found")),
        }
    }

    async fn conversation_history(
        &self,
        token: &Credential,
        args: &HistoryArgs,
    ) -> Result<HistoryResponse> {
        self.record("conversations.history", token, args)?;
        let messages = self
            .histories
            .get(&args.channel)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|m| match (&args.oldest, &m.ts) {
                (Some(oldest), Some(ts)) => compare_ts(ts, oldest).is_gt(),
                _ => true,
            })
            .take(args.limit)
            .cloned()
            .collect();
        Ok(HistoryResponse {
            messages,
            ..HistoryResponse::default()
        })
    }

    async fn conversation_replies(
        &self,
        token: &Credential,
        args: &RepliesArgs,
    ) -> Result<HistoryResponse> {
        self.record("conversations.replies", token, args)?;
        Ok(HistoryResponse {
            messages: self.replies.iter().take(args.limit).cloned().collect(),
            ..HistoryResponse::default()
        })
    }

    async fn users_list(&self, token: &Credential, args: &UsersListArgs) -> Result<UsersPage> {
        self.record("users.list", token, args)?;
        let index = page_index(args.cursor.as_deref());
        Ok(UsersPage {
            members: self.user_pages.get(index).cloned().unwrap_or_default(),
            response_metadata: metadata(index, self.user_pages.len()),
        })
    }

    async fn users_info(
        &self,
        token: &Credential,
        args: &UsersInfoArgs,
    ) -> Result<UsersInfoResponse> {
        self.record("users.info", token, args)?;
        Ok(UsersInfoResponse {
            user: self.user.clone(),
        })
    }

    async fn search_messages(
        &self,
        token: &Credential,
        args: &SearchArgs,
    ) -> Result<SearchResponse> {
        self.record("search.messages", token, args)?;
        Ok(self.search.clone())
    }
}
