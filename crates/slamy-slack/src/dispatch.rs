//! Credential routing.
//!
//! Every call the client makes is an [`Operation`]. Each operation needs a
//! fixed [`CredentialScope`] ([`scope_for`]); the [`CredentialStore`] turns
//! that scope into the token that is actually attached to the request.
//!
//! The store holds up to two tokens. When the scope an operation asks for
//! has no token, the store falls back to the one token it has, so a client
//! configured with a single token can run every operation.

use std::fmt;

use slamy_types::config::Config;
use slamy_types::{Credential, CredentialScope, SlackError};

/// Every logical operation the client performs against Slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PostMessage,
    ReplyToThread,
    UpdateMessage,
    DeleteMessage,
    AddReaction,
    RemoveReaction,
    UploadFile,
    ListChannels,
    ListUnreadChannels,
    ChannelHistory,
    ThreadReplies,
    ListUsers,
    UserProfile,
    SearchMessages,
    AuthTest,
}

impl Operation {
    /// All operations, in declaration order.
    pub const ALL: [Operation; 15] = [
        Operation::PostMessage,
        Operation::ReplyToThread,
        Operation::UpdateMessage,
        Operation::DeleteMessage,
        Operation::AddReaction,
        Operation::RemoveReaction,
        Operation::UploadFile,
        Operation::ListChannels,
        Operation::ListUnreadChannels,
        Operation::ChannelHistory,
        Operation::ThreadReplies,
        Operation::ListUsers,
        Operation::UserProfile,
        Operation::SearchMessages,
        Operation::AuthTest,
    ];

    /// Whether this operation changes workspace state.
    pub fn is_write(self) -> bool {
        scope_for(self) == CredentialScope::Elevated
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PostMessage => "post_message",
            Self::ReplyToThread => "reply_to_thread",
            Self::UpdateMessage => "update_message",
            Self::DeleteMessage => "delete_message",
            Self::AddReaction => "add_reaction",
            Self::RemoveReaction => "remove_reaction",
            Self::UploadFile => "upload_file",
            Self::ListChannels => "list_channels",
            Self::ListUnreadChannels => "list_unread_channels",
            Self::ChannelHistory => "channel_history",
            Self::ThreadReplies => "thread_replies",
            Self::ListUsers => "list_users",
            Self::UserProfile => "user_profile",
            Self::SearchMessages => "search_messages",
            Self::AuthTest => "auth_test",
        };
        f.write_str(name)
    }
}

/// The scope an operation runs under.
pub const fn scope_for(op: Operation) -> CredentialScope {
    match op {
        Operation::PostMessage
        | Operation::ReplyToThread
        | Operation::UpdateMessage
        | Operation::DeleteMessage
        | Operation::AddReaction
        | Operation::RemoveReaction
        | Operation::UploadFile => CredentialScope::Elevated,
        Operation::ListChannels
        | Operation::ListUnreadChannels
        | Operation::ChannelHistory
        | Operation::ThreadReplies
        | Operation::ListUsers
        | Operation::UserProfile
        | Operation::SearchMessages
        | Operation::AuthTest => CredentialScope::Standard,
    }
}

/// The client's configured tokens, fixed at construction.
///
/// At least one slot is always filled; [`CredentialStore::new`] refuses an
/// empty store.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialStore {
    slots: Slots,
}

#[derive(Clone, PartialEq, Eq)]
enum Slots {
    Both {
        elevated: Credential,
        standard: Credential,
    },
    ElevatedOnly(Credential),
    StandardOnly(Credential),
}

impl CredentialStore {
    /// Build a store from two optional tokens. Empty tokens count as absent.
    pub fn new(
        elevated: Option<Credential>,
        standard: Option<Credential>,
    ) -> Result<Self, SlackError> {
        let elevated = elevated.and_then(Credential::non_empty);
        let standard = standard.and_then(Credential::non_empty);
        let slots = match (elevated, standard) {
            (Some(elevated), Some(standard)) => Slots::Both { elevated, standard },
            (Some(elevated), None) => Slots::ElevatedOnly(elevated),
            (None, Some(standard)) => Slots::StandardOnly(standard),
            (None, None) => {
                return Err(SlackError::Configuration(
                    "either a bot token or a user token must be provided".into(),
                ));
            }
        };
        Ok(Self { slots })
    }

    /// Build a store from resolved configuration: the bot token fills the
    /// elevated slot, the user token the standard slot.
    pub fn from_config(config: &Config) -> Result<Self, SlackError> {
        Self::new(
            Some(config.bot_token.clone()),
            Some(config.user_token.clone()),
        )
    }

    /// The token configured for `scope`, if any.
    pub fn get(&self, scope: CredentialScope) -> Option<&Credential> {
        match (&self.slots, scope) {
            (Slots::Both { elevated, .. }, CredentialScope::Elevated) => Some(elevated),
            (Slots::Both { standard, .. }, CredentialScope::Standard) => Some(standard),
            (Slots::ElevatedOnly(c), CredentialScope::Elevated) => Some(c),
            (Slots::StandardOnly(c), CredentialScope::Standard) => Some(c),
            _ => None,
        }
    }

    /// The token to attach for `scope`: the scope's own token, or the only
    /// configured token when that scope has none.
    pub fn resolve(&self, scope: CredentialScope) -> &Credential {
        match &self.slots {
            Slots::Both { elevated, standard } => match scope {
                CredentialScope::Elevated => elevated,
                CredentialScope::Standard => standard,
            },
            Slots::ElevatedOnly(c) | Slots::StandardOnly(c) => c,
        }
    }

    /// The token for `op`.
    pub fn for_operation(&self, op: Operation) -> &Credential {
        self.resolve(scope_for(op))
    }

    /// Whether `scope` would be served by the other scope's token.
    pub fn is_fallback(&self, scope: CredentialScope) -> bool {
        self.get(scope).is_none()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("elevated", &self.get(CredentialScope::Elevated))
            .field("standard", &self.get(CredentialScope::Standard))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> CredentialStore {
        CredentialStore::new(Some("xoxb-bot".into()), Some("xoxp-user".into())).unwrap()
    }

    #[test]
    fn write_operations_are_elevated() {
        for op in [
            Operation::PostMessage,
            Operation::ReplyToThread,
            Operation::UpdateMessage,
            Operation::DeleteMessage,
            Operation::AddReaction,
            Operation::RemoveReaction,
            Operation::UploadFile,
        ] {
            assert_eq!(scope_for(op), CredentialScope::Elevated, "{op}");
            assert!(op.is_write());
        }
    }

    #[test]
    fn read_operations_are_standard() {
        for op in [
            Operation::ListChannels,
            Operation::ListUnreadChannels,
            Operation::ChannelHistory,
            Operation::ThreadReplies,
            Operation::ListUsers,
            Operation::UserProfile,
            Operation::SearchMessages,
            Operation::AuthTest,
        ] {
            assert_eq!(scope_for(op), CredentialScope::Standard, "{op}");
            assert!(!op.is_write());
        }
    }

    #[test]
    fn both_tokens_route_by_scope() {
        let store = both();
        assert_eq!(store.for_operation(Operation::PostMessage).expose(), "xoxb-bot");
        assert_eq!(store.for_operation(Operation::SearchMessages).expose(), "xoxp-user");
        assert!(!store.is_fallback(CredentialScope::Elevated));
        assert!(!store.is_fallback(CredentialScope::Standard));
    }

    #[test]
    fn bot_only_serves_every_operation() {
        let store = CredentialStore::new(Some("xoxb-bot".into()), None).unwrap();
        for op in Operation::ALL {
            assert_eq!(store.for_operation(op).expose(), "xoxb-bot", "{op}");
        }
        assert!(store.is_fallback(CredentialScope::Standard));
    }

    #[test]
    fn user_only_serves_every_operation() {
        let store = CredentialStore::new(None, Some("xoxp-user".into())).unwrap();
        for op in Operation::ALL {
            assert_eq!(store.for_operation(op).expose(), "xoxp-user", "{op}");
        }
        assert!(store.get(CredentialScope::Elevated).is_none());
    }

    #[test]
    fn no_tokens_is_configuration_error() {
        let err = CredentialStore::new(None, None).unwrap_err();
        assert!(matches!(err, SlackError::Configuration(_)));
        assert!(err.to_string().contains("bot token or a user token"));
    }

    #[test]
    fn empty_tokens_count_as_absent() {
        assert!(CredentialStore::new(Some("".into()), Some("  ".into())).is_err());
        let store = CredentialStore::new(Some("".into()), Some("xoxp-user".into())).unwrap();
        assert!(store.get(CredentialScope::Elevated).is_none());
    }

    #[test]
    fn from_config_maps_bot_and_user() {
        let config = Config {
            bot_token: "xoxb-cfg".into(),
            user_token: "xoxp-cfg".into(),
            ..Config::default()
        };
        let store = CredentialStore::from_config(&config).unwrap();
        assert_eq!(store.resolve(CredentialScope::Elevated).expose(), "xoxb-cfg");
        assert_eq!(store.resolve(CredentialScope::Standard).expose(), "xoxp-cfg");
    }

    #[test]
    fn debug_never_prints_tokens() {
        let dbg = format!("{:?}", both());
        assert!(!dbg.contains("xoxb-bot"));
        assert!(!dbg.contains("xoxp-user"));
        assert!(dbg.contains("REDACTED"));
    }
}
