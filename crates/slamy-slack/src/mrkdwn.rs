//! Bold-markup repair for Slack `mrkdwn`.
//!
//! Slack's renderer drops bold styling when a non-ASCII character (a
//! fullwidth colon, a CJK bracket, an emoji) directly follows the closing
//! `*`. [`fix_mrkdwn`] rewrites the text so it renders as intended:
//!
//! 1. Markdown `**bold**` becomes Slack `*bold*`; a fullwidth colon right
//!    after it becomes `": "`.
//! 2. A fullwidth colon after a single-asterisk span becomes `": "`.
//! 3. A space is inserted between a closing `*` and any other non-ASCII
//!    character.
//!
//! The rules run in that order, each over the previous rule's output.
//! Within a rule matches are leftmost and non-overlapping, so text already
//! fixed by an earlier rule is not rewritten again. Pure ASCII text,
//! already-spaced text and stray asterisks (`5 * 3`) pass through.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// One rewrite step: a pattern and how to render each match.
struct Rule {
    pattern: Regex,
    rewrite: fn(&Captures<'_>) -> String,
}

impl Rule {
    fn new(pattern: &str, rewrite: fn(&Captures<'_>) -> String) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("mrkdwn rule pattern must compile"),
            rewrite,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| (self.rewrite)(caps))
            .into_owned()
    }
}

static RULES: LazyLock<[Rule; 3]> = LazyLock::new(|| {
    [
        // **bold**(：) -> *bold*: or *bold*
        Rule::new(r"\*\*([^*]+)\*\*(\x{FF1A})?", |caps| {
            if caps.get(2).is_some() {
                format!("*{}*: ", &caps[1])
            } else {
                format!("*{}*", &caps[1])
            }
        }),
        // *bold*： -> *bold*:
        Rule::new(r"(\*[^*\n]+\*)\x{FF1A}", |caps| format!("{}: ", &caps[1])),
        // *bold*（ -> *bold* （
        Rule::new(r"(\*[^*\n]+\*)([^\x00-\x7F])", |caps| {
            format!("{} {}", &caps[1], &caps[2])
        }),
    ]
});

/// Repair bold markup so Slack renders it. Never fails.
pub fn fix_mrkdwn(text: &str) -> String {
    RULES
        .iter()
        .fold(text.to_owned(), |acc, rule| rule.apply(&acc))
}
