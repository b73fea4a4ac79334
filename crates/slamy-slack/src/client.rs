//! [`SlackClient`]: the request façade.
//!
//! Every public method is one logical operation. Write operations run the
//! outbound text through [`fix_mrkdwn`] and [`split_default`] before
//! sending; read operations go straight to the protocol client. The
//! credential for each call comes from the [`CredentialStore`] according
//! to [`scope_for`](crate::dispatch::scope_for).

use std::cmp::Ordering;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

use slamy_types::config::Config;
use slamy_types::model::{
    AuthInfo, ChannelInfo, Message, PostedMessage, SearchMatch, SearchResult, UnreadChannel, User,
    UserProfile,
};
use slamy_types::{Credential, Result, SlackError};

use crate::api::{
    CONVERSATION_TYPES, ConversationInfoArgs, DeleteMessageArgs, HistoryArgs, PostMessageArgs,
    ReactionArgs, RepliesArgs, SearchArgs, SlackApi, UpdateMessageArgs, UploadFileArgs,
    UsersConversationsArgs, UsersInfoArgs, UsersListArgs,
};
use crate::dispatch::{CredentialStore, Operation, scope_for};
use crate::http::HttpSlackApi;
use crate::mrkdwn::fix_mrkdwn;
use crate::split::{MAX_MESSAGE_LENGTH, char_count, split_default};
use crate::types::{Conversation, WireMessage, WireUser};
use crate::upload::{UploadOptions, UploadSource};

/// Default number of channels returned by [`SlackClient::list_channels`].
pub const DEFAULT_CHANNEL_LIMIT: usize = 100;

/// Largest page requested from `users.conversations` and `users.list`.
pub const MAX_PAGE_SIZE: usize = 200;

/// Default number of messages returned by [`SlackClient::channel_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default number of messages returned by [`SlackClient::thread_replies`].
pub const DEFAULT_REPLIES_LIMIT: usize = 50;

/// Cap on the unread count reported per channel (one history page).
pub const UNREAD_COUNT_LIMIT: usize = 100;

/// Channels checked at once by [`SlackClient::list_unread_channels`].
const UNREAD_CONCURRENCY: usize = 10;

/// Options for [`SlackClient::search_messages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// `"timestamp"` or `"score"`.
    pub sort: String,
    /// `"desc"` or `"asc"`.
    pub sort_dir: String,
    pub count: u32,
    pub page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort: "timestamp".into(),
            sort_dir: "desc".into(),
            count: 20,
            page: 1,
        }
    }
}

/// High-level Slack client.
///
/// Holds the protocol client and the credential store; both are fixed at
/// construction. The client is `Send + Sync` and can be shared behind an
/// `Arc`.
pub struct SlackClient {
    api: Arc<dyn SlackApi>,
    credentials: CredentialStore,
}

impl SlackClient {
    /// Build a client over the HTTP binding from configuration.
    ///
    /// Fails with [`SlackError::Configuration`] when neither a bot token
    /// nor a user token is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = CredentialStore::from_config(config)?;
        Ok(Self::with_api(
            Arc::new(HttpSlackApi::from_config(config)),
            credentials,
        ))
    }

    /// Build a client over an arbitrary protocol implementation.
    pub fn with_api(api: Arc<dyn SlackApi>, credentials: CredentialStore) -> Self {
        Self { api, credentials }
    }

    /// The credential store in use.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn credential(&self, op: Operation) -> &Credential {
        let scope = scope_for(op);
        let token = self.credentials.for_operation(op);
        if self.credentials.is_fallback(scope) {
            debug!(
                operation = %op,
                scope = %scope,
                kind = %token.kind(),
                "no credential for scope, using the configured one"
            );
        }
        token
    }

    // --- Write operations ---

    /// Post a message, splitting it when it is too long.
    ///
    /// The first chunk is posted top-level; any further chunks are posted
    /// as replies in the thread it starts. Returns the first chunk's `ts`.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage> {
        let token = self.credential(Operation::PostMessage);
        let chunks = split_default(&fix_mrkdwn(text));
        debug!(channel, chunks = chunks.len(), "posting message");

        let mut chunks = chunks.into_iter();
        let first = chunks.next().unwrap_or_default();
        let ts = self.send_chunk(token, channel, first, None).await?;
        for chunk in chunks {
            self.send_chunk(token, channel, chunk, Some(ts.clone()))
                .await?;
        }

        Ok(PostedMessage {
            channel: channel.to_owned(),
            ts,
        })
    }

    /// Reply in a thread, splitting the text when it is too long.
    ///
    /// Every chunk is posted to `thread_ts`. Returns the first chunk's `ts`.
    pub async fn reply_to_thread(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<PostedMessage> {
        let token = self.credential(Operation::ReplyToThread);
        let chunks = split_default(&fix_mrkdwn(text));
        debug!(channel, thread_ts, chunks = chunks.len(), "replying to thread");

        let mut first_ts = None;
        for chunk in chunks {
            let ts = self
                .send_chunk(token, channel, chunk, Some(thread_ts.to_owned()))
                .await?;
            first_ts.get_or_insert(ts);
        }

        Ok(PostedMessage {
            channel: channel.to_owned(),
            ts: first_ts.unwrap_or_default(),
        })
    }

    async fn send_chunk(
        &self,
        token: &Credential,
        channel: &str,
        text: String,
        thread_ts: Option<String>,
    ) -> Result<String> {
        let args = PostMessageArgs {
            channel: channel.to_owned(),
            text,
            thread_ts,
        };
        let resp = self.api.post_message(token, &args).await?;
        resp.ts
            .ok_or_else(|| SlackError::upstream("chat.postMessage", "response contained no ts"))
    }

    /// Replace the text of an existing message.
    ///
    /// The text is sent as-is: no markup repair and no splitting. Text
    /// longer than [`MAX_MESSAGE_LENGTH`] is rejected before any call.
    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<PostedMessage> {
        if char_count(text) > MAX_MESSAGE_LENGTH {
            return Err(SlackError::Validation(format!(
                "message exceeds {MAX_MESSAGE_LENGTH} characters; update does not support auto-splitting"
            )));
        }

        let args = UpdateMessageArgs {
            channel: channel.to_owned(),
            ts: ts.to_owned(),
            text: text.to_owned(),
        };
        self.api
            .update_message(self.credential(Operation::UpdateMessage), &args)
            .await?;

        Ok(PostedMessage {
            channel: channel.to_owned(),
            ts: ts.to_owned(),
        })
    }

    /// Delete a message.
    pub async fn delete_message(&self, channel: &str, ts: &str) -> Result<()> {
        let args = DeleteMessageArgs {
            channel: channel.to_owned(),
            ts: ts.to_owned(),
        };
        self.api
            .delete_message(self.credential(Operation::DeleteMessage), &args)
            .await
    }

    /// Add an emoji reaction (`name` without colons).
    pub async fn add_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        let args = reaction_args(channel, ts, name);
        self.api
            .add_reaction(self.credential(Operation::AddReaction), &args)
            .await
    }

    /// Remove an emoji reaction.
    pub async fn remove_reaction(&self, channel: &str, ts: &str, name: &str) -> Result<()> {
        let args = reaction_args(channel, ts, name);
        self.api
            .remove_reaction(self.credential(Operation::RemoveReaction), &args)
            .await
    }

    /// Upload a file to a channel, optionally into a thread.
    pub async fn upload_file(
        &self,
        channel: &str,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<()> {
        let upload = source.resolve(&options).await?;
        info!(
            channel,
            filename = %upload.filename,
            bytes = upload.content.len(),
            "uploading file"
        );

        let args = UploadFileArgs {
            channel_id: channel.to_owned(),
            filename: upload.filename,
            title: upload.title,
            thread_ts: options.thread_ts,
            content: upload.content,
        };
        self.api
            .upload_file(self.credential(Operation::UploadFile), &args)
            .await
    }

    // --- Read operations ---

    /// List conversations the caller belongs to.
    ///
    /// Pages through `users.conversations` until the listing is exhausted
    /// or `limit` channels have been collected. A `limit` of 0 means no
    /// limit. Archived channels are excluded unless `include_archived`.
    pub async fn list_channels(
        &self,
        limit: usize,
        include_archived: bool,
    ) -> Result<Vec<ChannelInfo>> {
        let token = self.credential(Operation::ListChannels);
        let identity = self.api.auth_test(token).await?;
        debug!(user = ?identity.user_id, "listing channels");

        let page_size = if limit == 0 {
            MAX_PAGE_SIZE
        } else {
            limit.min(MAX_PAGE_SIZE)
        };

        let mut collected: Vec<Conversation> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let args = UsersConversationsArgs {
                user: identity.user_id.clone(),
                types: CONVERSATION_TYPES.to_owned(),
                exclude_archived: !include_archived,
                limit: page_size,
                cursor: cursor.take(),
            };
            let page = self.api.users_conversations(token, &args).await?;
            cursor = page.next_cursor().map(str::to_owned);
            collected.extend(page.channels);

            if limit > 0 && collected.len() >= limit {
                break;
            }
            if cursor.is_none() {
                break;
            }
        }

        if limit > 0 {
            collected.truncate(limit);
        }
        Ok(collected.into_iter().map(channel_info).collect())
    }

    /// List channels that have messages newer than the caller's read
    /// marker.
    ///
    /// Channels are checked concurrently; a channel whose check fails is
    /// left out of the result.
    pub async fn list_unread_channels(&self, limit: usize) -> Result<Vec<UnreadChannel>> {
        let channels = self.list_channels(limit, false).await?;
        let token = self.credential(Operation::ListUnreadChannels);

        let checked: Vec<Option<UnreadChannel>> = stream::iter(channels)
            .map(move |channel| async move {
                let id = channel.id.clone();
                match self.check_unread(token, channel).await {
                    Ok(found) => found,
                    Err(e) => {
                        debug!(channel = %id, error = %e, "unread check failed, skipping channel");
                        None
                    }
                }
            })
            .buffered(UNREAD_CONCURRENCY)
            .collect()
            .await;

        Ok(checked.into_iter().flatten().collect())
    }

    async fn check_unread(
        &self,
        token: &Credential,
        channel: ChannelInfo,
    ) -> Result<Option<UnreadChannel>> {
        let info = self
            .api
            .conversation_info(
                token,
                &ConversationInfoArgs {
                    channel: channel.id.clone(),
                },
            )
            .await?;
        let Some(conversation) = info.channel.filter(|c| c.is_member.unwrap_or(false)) else {
            return Ok(None);
        };
        let last_read = conversation
            .last_read
            .filter(|ts| !ts.is_empty())
            .unwrap_or_else(|| "0".to_owned());

        let latest = self
            .api
            .conversation_history(
                token,
                &HistoryArgs {
                    channel: channel.id.clone(),
                    limit: 1,
                    oldest: None,
                },
            )
            .await?;
        let Some(latest_ts) = latest.messages.into_iter().next().and_then(|m| m.ts) else {
            return Ok(None);
        };
        if compare_ts(&latest_ts, &last_read) != Ordering::Greater {
            return Ok(None);
        }

        let count_args = HistoryArgs {
            channel: channel.id.clone(),
            limit: UNREAD_COUNT_LIMIT,
            oldest: Some(last_read),
        };
        let unread_count = match self.api.conversation_history(token, &count_args).await {
            Ok(page) => page.messages.len().max(1) as u64,
            Err(e) => {
                debug!(channel = %channel.id, error = %e, "unread count failed, reporting 1");
                1
            }
        };

        Ok(Some(UnreadChannel {
            channel,
            unread_count,
        }))
    }

    /// Most recent messages of a channel, newest first.
    pub async fn channel_history(&self, channel: &str, limit: usize) -> Result<Vec<Message>> {
        let args = HistoryArgs {
            channel: channel.to_owned(),
            limit,
            oldest: None,
        };
        let resp = self
            .api
            .conversation_history(self.credential(Operation::ChannelHistory), &args)
            .await?;
        Ok(resp.messages.into_iter().map(history_message).collect())
    }

    /// Messages of a thread, parent first.
    pub async fn thread_replies(
        &self,
        channel: &str,
        thread_ts: &str,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let args = RepliesArgs {
            channel: channel.to_owned(),
            ts: thread_ts.to_owned(),
            limit,
        };
        let resp = self
            .api
            .conversation_replies(self.credential(Operation::ThreadReplies), &args)
            .await?;
        Ok(resp
            .messages
            .into_iter()
            .map(|m| Message {
                thread_ts: None,
                reply_count: None,
                ..history_message(m)
            })
            .collect())
    }

    /// List workspace members.
    ///
    /// Bots and deactivated accounts are excluded unless requested.
    pub async fn list_users(
        &self,
        include_deactivated: bool,
        include_bots: bool,
    ) -> Result<Vec<User>> {
        let token = self.credential(Operation::ListUsers);
        let mut members: Vec<WireUser> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let args = UsersListArgs {
                limit: MAX_PAGE_SIZE,
                cursor: cursor.take(),
            };
            let page = self.api.users_list(token, &args).await?;
            cursor = page.next_cursor().map(str::to_owned);
            members.extend(page.members);
            if cursor.is_none() {
                break;
            }
        }

        Ok(members
            .into_iter()
            .filter(|u| include_bots || !u.is_bot.unwrap_or(false))
            .filter(|u| include_deactivated || !u.deleted.unwrap_or(false))
            .map(user_summary)
            .collect())
    }

    /// Full profile of one user.
    pub async fn user_profile(&self, user: &str) -> Result<UserProfile> {
        let args = UsersInfoArgs {
            user: user.to_owned(),
        };
        let resp = self
            .api
            .users_info(self.credential(Operation::UserProfile), &args)
            .await?;
        let user = resp
            .user
            .ok_or_else(|| SlackError::upstream("users.info", "response contained no user"))?;
        Ok(user_profile(user))
    }

    /// Search messages visible to the caller.
    pub async fn search_messages(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult> {
        let args = SearchArgs {
            query: query.to_owned(),
            sort: options.sort.clone(),
            sort_dir: options.sort_dir.clone(),
            count: options.count,
            page: options.page,
        };
        let resp = self
            .api
            .search_messages(self.credential(Operation::SearchMessages), &args)
            .await?;

        let messages = resp.messages.unwrap_or_default();
        let matches = messages
            .matches
            .into_iter()
            .map(|m| {
                let channel = m.channel.unwrap_or_default();
                SearchMatch {
                    ts: m.ts.unwrap_or_default(),
                    channel: channel.name.unwrap_or_default(),
                    channel_id: channel.id.unwrap_or_default(),
                    user: m.user.unwrap_or_default(),
                    text: m.text.unwrap_or_default(),
                    permalink: m.permalink.unwrap_or_default(),
                }
            })
            .collect();

        Ok(SearchResult {
            matches,
            total: messages.total.unwrap_or(0),
            page: messages.paging.and_then(|p| p.page).unwrap_or(1),
        })
    }

    /// Identity behind the read credential.
    pub async fn auth_test(&self) -> Result<AuthInfo> {
        let resp = self
            .api
            .auth_test(self.credential(Operation::AuthTest))
            .await?;
        Ok(AuthInfo {
            user_id: resp.user_id.unwrap_or_default(),
            user: resp.user.unwrap_or_default(),
            team_id: resp.team_id.unwrap_or_default(),
            team: resp.team.unwrap_or_default(),
            url: resp.url.unwrap_or_default(),
        })
    }
}

fn reaction_args(channel: &str, ts: &str, name: &str) -> ReactionArgs {
    ReactionArgs {
        channel: channel.to_owned(),
        timestamp: ts.to_owned(),
        name: name.to_owned(),
    }
}

fn channel_info(c: Conversation) -> ChannelInfo {
    ChannelInfo {
        id: c.id,
        name: c.name.unwrap_or_default(),
        topic: c.topic.and_then(|t| t.value).unwrap_or_default(),
        purpose: c.purpose.and_then(|p| p.value).unwrap_or_default(),
        num_members: c.num_members.unwrap_or(0),
        is_private: c.is_private.unwrap_or(false),
        is_archived: c.is_archived.unwrap_or(false),
    }
}

fn history_message(m: WireMessage) -> Message {
    Message {
        ts: m.ts.unwrap_or_default(),
        user: m.user.unwrap_or_default(),
        text: m.text.unwrap_or_default(),
        thread_ts: m.thread_ts,
        reply_count: m.reply_count,
    }
}

fn user_summary(u: WireUser) -> User {
    let profile = u.profile.unwrap_or_default();
    User {
        id: u.id,
        name: u.name.unwrap_or_default(),
        real_name: u.real_name.unwrap_or_default(),
        display_name: profile.display_name.unwrap_or_default(),
        email: profile.email,
        is_bot: u.is_bot.unwrap_or(false),
        deleted: u.deleted.unwrap_or(false),
    }
}

fn user_profile(u: WireUser) -> UserProfile {
    let profile = u.profile.unwrap_or_default();
    UserProfile {
        id: u.id,
        name: u.name.unwrap_or_default(),
        real_name: u.real_name.unwrap_or_default(),
        display_name: profile.display_name.unwrap_or_default(),
        email: profile.email.unwrap_or_default(),
        title: profile.title.unwrap_or_default(),
        phone: profile.phone.unwrap_or_default(),
        status_text: profile.status_text.unwrap_or_default(),
        status_emoji: profile.status_emoji.unwrap_or_default(),
        tz: u.tz.unwrap_or_default(),
        is_admin: u.is_admin.unwrap_or(false),
        is_bot: u.is_bot.unwrap_or(false),
        deleted: u.deleted.unwrap_or(false),
    }
}

/// Order two Slack timestamps (`"<seconds>.<micros>"`).
///
/// Falls back to string order when either side does not parse.
pub(crate) fn compare_ts(a: &str, b: &str) -> Ordering {
    match (parse_ts(a), parse_ts(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn parse_ts(ts: &str) -> Option<(u64, u64)> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    let secs = secs.parse().ok()?;
    let frac = if frac.is_empty() {
        0
    } else {
        // Right-pad so "1.5" and "1.500000" compare equal.
        format!("{frac:0<6}").get(..6)?.parse().ok()?
    };
    Some((secs, frac))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_order() {
        assert_eq!(compare_ts("1700000010.000100", "1700000009.999999"), Ordering::Greater);
        assert_eq!(compare_ts("9.000001", "10.000000"), Ordering::Less);
    }

    #[test]
    fn zero_read_marker() {
        assert_eq!(compare_ts("1700000000.000100", "0"), Ordering::Greater);
    }

    #[test]
    fn short_fraction_pads() {
        assert_eq!(compare_ts("1.5", "1.500000"), Ordering::Equal);
    }

    #[test]
    fn unparsable_falls_back_to_string_order() {
        assert_eq!(compare_ts("abc", "abd"), Ordering::Less);
    }
}
