//! The invocation trigger token and the one place its remnants are removed.

use crate::error::CueError;
use regex::Regex;

/// Token that opens the menu when typed.
pub const DEFAULT_TRIGGER: &str = "qq";

/// A trigger match against the text from field start to caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Character offset of the token.
    pub start: usize,
    /// Characters typed after the token.
    pub filter: String,
}

/// Compiled trigger token.
#[derive(Debug, Clone)]
pub struct Trigger {
    token: String,
    scan: Regex,
}

impl Trigger {
    /// Compile the scan pattern `<token>(.*)$` for a literal token.
    pub fn new(token: &str) -> Result<Self, CueError> {
        if token.is_empty() {
            return Err(CueError::EmptyTrigger);
        }
        let scan = Regex::new(&format!("{}(.*)$", regex::escape(token)))?;
        Ok(Self {
            token: token.to_string(),
            scan,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Match the token plus filter, anchored at the end of `text_to_caret`.
    ///
    /// `.` does not cross line breaks, so a token on an earlier line never matches.
    pub fn find(&self, text_to_caret: &str) -> Option<TriggerMatch> {
        let caps = self.scan.captures(text_to_caret)?;
        let whole = caps.get(0)?;
        let filter = caps.get(1).map_or("", |m| m.as_str());
        Some(TriggerMatch {
            start: text_to_caret[..whole.start()].chars().count(),
            filter: filter.to_string(),
        })
    }

    /// Remove one trailing occurrence of the token.
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        text.strip_suffix(self.token.as_str()).unwrap_or(text)
    }

    /// Replace a trailing token with `content_tag`, marking the spot as consumed.
    ///
    /// Text without a trailing token is returned unchanged.
    pub fn consume(&self, text: &str, content_tag: &str) -> String {
        match text.strip_suffix(self.token.as_str()) {
            Some(rest) => format!("{rest}{content_tag}"),
            None => text.to_string(),
        }
    }

    /// Split `text` around an invocation at character `start`: the token and then `filter`.
    ///
    /// Returns the text before and after the invocation, or `None` when the token is no
    /// longer at `start`. A filter that no longer follows the token is left in place.
    pub fn cut<'a>(&self, text: &'a str, start: usize, filter: &str) -> Option<(&'a str, &'a str)> {
        let (idx, _) = text.char_indices().nth(start)?;
        let rest = text[idx..].strip_prefix(self.token.as_str())?;
        let rest = rest.strip_prefix(filter).unwrap_or(rest);
        Some((&text[..idx], rest))
    }

    /// Replace the invocation at `start` with `content_tag`.
    ///
    /// Falls back to [`Trigger::consume`] when the token is not at `start`.
    pub fn consume_at(&self, text: &str, start: usize, filter: &str, content_tag: &str) -> String {
        match self.cut(text, start, filter) {
            Some((before, after)) => format!("{before}{content_tag}{after}"),
            None => self.consume(text, content_tag),
        }
    }
}
