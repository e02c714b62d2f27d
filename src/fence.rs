//! Triple-backtick fencing used to exchange whole files with the model
//!
//! The model is asked to wrap a resolved file in a bare fence:
//!
//! ```text
//! Updating the file!
//! <three backticks>
//! <file body>
//! <three backticks>
//! ```
//!
//! A type annotation on the opening fence line is discarded, and one newline
//! (LF or CRLF) before the closing fence belongs to the fence, not the body.

pub const FENCE: &str = "```";

/// Result of scanning a reply for a fenced block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceMatch<'a> {
    Found {
        /// Text before the opening fence, trailing whitespace removed
        preamble: &'a str,
        /// Text strictly between the fence lines
        body: &'a str,
    },
    NotFound,
}

#[cfg(test)]
impl<'a> FenceMatch<'a> {
    pub fn body(self) -> Option<&'a str> {
        match self {
            FenceMatch::Found { body, .. } => Some(body),
            FenceMatch::NotFound => None,
        }
    }
}

/// Wrap `body` in a bare fence.
pub fn fence(body: &str) -> String {
    if body.ends_with('\n') {
        format!("{FENCE}\n{body}{FENCE}")
    } else {
        format!("{FENCE}\n{body}\n{FENCE}")
    }
}

/// Locate the first fenced block in `text`.
pub fn extract(text: &str) -> FenceMatch<'_> {
    let Some(open) = text.find(FENCE) else {
        return FenceMatch::NotFound;
    };
    let preamble = text[..open].trim_end();

    let after_open = &text[open + FENCE.len()..];
    let Some(line_end) = after_open.find('\n') else {
        return FenceMatch::NotFound;
    };

    let rest = &after_open[line_end + 1..];
    let Some(close) = rest.find(FENCE) else {
        return FenceMatch::NotFound;
    };

    let body = &rest[..close];
    let body = match body.strip_suffix('\n') {
        Some(trimmed) => trimmed.strip_suffix('\r').unwrap_or(trimmed),
        None => body,
    };

    FenceMatch::Found { preamble, body }
}
