//! Slack credentials and the scopes they are bound to.
//!
//! [`Credential`] wraps a Slack token (`xoxb-...`, `xoxp-...`, `xapp-...`)
//! and knows its [`TokenKind`]; logs and dumps see only the kind prefix.
//! [`CredentialScope`] names the tier an operation needs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The credential tier an operation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    /// Write credential (the bot token). Used for posting, editing,
    /// deleting, reacting and uploading.
    Elevated,
    /// Read credential (the user token). Used for listing, history,
    /// profile lookup, search and the identity check.
    Standard,
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elevated => f.write_str("elevated"),
            Self::Standard => f.write_str("standard"),
        }
    }
}

/// What a token is, judged by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `xoxb-`: bot token.
    Bot,
    /// `xoxp-`: user token.
    User,
    /// `xapp-`: app-level token for Socket Mode.
    App,
    /// Anything else, including tokens from tests and proxies.
    Other,
}

impl TokenKind {
    const PREFIXES: [(&'static str, TokenKind); 3] = [
        ("xoxb-", TokenKind::Bot),
        ("xoxp-", TokenKind::User),
        ("xapp-", TokenKind::App),
    ];

    fn of(token: &str) -> Self {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| token.starts_with(prefix))
            .map_or(TokenKind::Other, |(_, kind)| *kind)
    }

    /// The token prefix, if the kind has one.
    pub fn prefix(self) -> Option<&'static str> {
        Self::PREFIXES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(prefix, _)| *prefix)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bot => "bot",
            Self::User => "user",
            Self::App => "app",
            Self::Other => "other",
        })
    }
}

/// A Slack token.
///
/// Surrounding whitespace is dropped on construction, so a token pasted
/// with a trailing newline still authenticates. Every rendering except
/// [`expose`](Credential::expose) keeps the kind prefix and hides the rest
/// (`xoxb-[REDACTED]`); an empty credential renders as nothing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// The raw token. Only the transport should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no token is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for an empty token, `Some(self)` otherwise.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// The kind of token, from its prefix.
    pub fn kind(&self) -> TokenKind {
        TokenKind::of(&self.0)
    }

    fn redacted(&self) -> String {
        match (self.is_empty(), self.kind().prefix()) {
            (true, _) => String::new(),
            (false, Some(prefix)) => format!("{prefix}[REDACTED]"),
            (false, None) => "[REDACTED]".to_owned(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.redacted())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Dumped configs show which kinds of token are set, never the tokens.
impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.redacted())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_prefix() {
        assert_eq!(Credential::new("xoxb-1").kind(), TokenKind::Bot);
        assert_eq!(Credential::new("xoxp-1").kind(), TokenKind::User);
        assert_eq!(Credential::new("xapp-1").kind(), TokenKind::App);
        assert_eq!(Credential::new("test-token").kind(), TokenKind::Other);
        assert_eq!(TokenKind::App.prefix(), Some("xapp-"));
        assert_eq!(TokenKind::Other.prefix(), None);
    }

    #[test]
    fn renderings_keep_only_the_prefix() {
        let bot = Credential::new("xoxb-secret");
        assert_eq!(format!("{bot:?}"), "\"xoxb-[REDACTED]\"");
        assert_eq!(bot.to_string(), "xoxb-[REDACTED]");
        assert_eq!(Credential::new("opaque").to_string(), "[REDACTED]");
        assert_eq!(format!("{:?}", Credential::default()), "\"\"");
        assert_eq!(Credential::default().to_string(), "");
    }

    #[test]
    fn serialize_never_leaks() {
        let json = serde_json::to_string(&Credential::new("xoxp-leak")).unwrap();
        assert_eq!(json, "\"xoxp-[REDACTED]\"");
    }

    #[test]
    fn surrounding_whitespace_is_dropped() {
        let c: Credential = serde_json::from_str("\" xoxp-abc\\n\"").unwrap();
        assert_eq!(c.expose(), "xoxp-abc");
        assert_eq!(c.kind(), TokenKind::User);
        assert!(Credential::new("   ").is_empty());
        assert!(Credential::new("  ").non_empty().is_none());
        assert!(Credential::from("xoxb-1").non_empty().is_some());
    }

    #[test]
    fn scope_display_and_serde() {
        assert_eq!(CredentialScope::Elevated.to_string(), "elevated");
        assert_eq!(CredentialScope::Standard.to_string(), "standard");
        let json = serde_json::to_string(&CredentialScope::Elevated).unwrap();
        assert_eq!(json, "\"elevated\"");
    }
}
