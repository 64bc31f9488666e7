//! Helpers for keeping secrets out of logs.

use std::fmt::{Debug, Formatter};

/// Shortest value that keeps its edges visible.
const REDACT_MIN_LEN: usize = 12;
/// Characters kept at each edge.
const REDACT_KEEP: usize = 3;

/// Redact wraps a secret so that `{:?}` never prints it in full.
///
/// Values of at least 12 bytes keep their first and last three characters, so
/// two different keys can still be told apart in a log. Shorter values print as
/// `***` and empty ones as `EMPTY`.
#[derive(Clone, Copy)]
pub struct Redact<'a>(&'a str);

impl<'a> Redact<'a> {
    fn edges(&self) -> Option<(&'a str, &'a str)> {
        let s = self.0;
        let len = s.len();
        if len < REDACT_MIN_LEN {
            return None;
        }
        let tail = len - REDACT_KEEP;
        if !s.is_char_boundary(REDACT_KEEP) || !s.is_char_boundary(tail) {
            return None;
        }
        Some((&s[..REDACT_KEEP], &s[tail..]))
    }
}

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value)
    }
}

/// Header values that are not visible ASCII are hidden as a whole.
impl<'a> From<&'a http::HeaderValue> for Redact<'a> {
    fn from(value: &'a http::HeaderValue) -> Self {
        Redact(value.to_str().unwrap_or("<opaque>"))
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("EMPTY");
        }
        match self.edges() {
            Some((head, tail)) => write!(f, "{head}***{tail}"),
            None => f.write_str("***"),
        }
    }
}
