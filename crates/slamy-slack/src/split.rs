//! Message chunking.
//!
//! Slack rejects messages longer than [`MAX_MESSAGE_LENGTH`] characters.
//! [`split_message`] breaks long text into chunks that fit, preferring
//! paragraph boundaries (`"\n\n"`), then line boundaries (`"\n"`), and only
//! falling back to a hard split by character count when a single line is
//! too long. Lengths are measured in Unicode scalar values (`char`s), so a
//! chunk boundary never lands inside a multi-byte character.

use std::mem;

/// Maximum character count for a single Slack message.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

const PARAGRAPH_SEP: &str = "\n\n";
const LINE_SEP: &str = "\n";

/// Split `text` into chunks of at most `max_len` characters.
///
/// Text that already fits is returned as a single chunk, unchanged (this
/// includes the empty string, which yields `[""]`). Separators at which the
/// text was split are not carried into either neighbouring chunk.
///
/// A `max_len` of zero is treated as one.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);

    if char_count(text) <= max_len {
        return vec![text.to_owned()];
    }

    let mut acc = ChunkAccumulator::new(max_len);
    for paragraph in text.split(PARAGRAPH_SEP) {
        acc.push_paragraph(paragraph);
    }
    acc.finish()
}

/// [`split_message`] with the Slack limit.
pub fn split_default(text: &str) -> Vec<String> {
    split_message(text, MAX_MESSAGE_LENGTH)
}

/// Number of Unicode scalar values in `s`.
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Greedy accumulator shared by the paragraph and line passes.
struct ChunkAccumulator {
    max_len: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl ChunkAccumulator {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    /// Append `piece` to the running chunk if it still fits, re-inserting
    /// `sep` when the chunk already has content.
    fn try_append(&mut self, piece: &str, piece_len: usize, sep: &str) -> bool {
        let sep_len = if self.current_len > 0 { sep.len() } else { 0 };
        if self.current_len + sep_len + piece_len > self.max_len {
            return false;
        }
        if sep_len > 0 {
            self.current.push_str(sep);
        }
        self.current.push_str(piece);
        self.current_len += sep_len + piece_len;
        true
    }

    fn flush(&mut self) {
        if self.current_len > 0 {
            self.chunks.push(mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        let len = char_count(paragraph);
        if self.try_append(paragraph, len, PARAGRAPH_SEP) {
            return;
        }
        self.flush();

        if len <= self.max_len {
            self.current = paragraph.to_owned();
            self.current_len = len;
            return;
        }

        for line in paragraph.split(LINE_SEP) {
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: &str) {
        let len = char_count(line);
        if self.try_append(line, len, LINE_SEP) {
            return;
        }
        self.flush();

        if len <= self.max_len {
            self.current = line.to_owned();
            self.current_len = len;
            return;
        }

        split_by_chars(line, self.max_len, &mut self.chunks);
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Hard-split `s` into runs of exactly `max_len` chars (the last run may be
/// shorter). Slices only at char boundaries.
fn split_by_chars(s: &str, max_len: usize, chunks: &mut Vec<String>) {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in s.char_indices() {
        if count == max_len {
            chunks.push(s[start..idx].to_owned());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < s.len() {
        chunks.push(s[start..].to_owned());
    }
}
