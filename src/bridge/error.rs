use std::time::Duration;

use thiserror::Error;

/// Terminal failure of one conversion. No category is retried; each maps to
/// one HTTP status in the handler layer.
#[derive(Debug, Error)]
pub enum Failure {
    /// The source reference is missing, unparseable or not http(s).
    #[error("invalid video url: {0}")]
    InvalidInput(String),
    /// The upstream GET failed at transport level or returned non-2xx.
    #[error("error fetching video: {0}")]
    UpstreamFetch(String),
    /// The transcoder binary could not be spawned.
    #[error("could not start transcoder: {0}")]
    ProcessLaunch(String),
    /// I/O failed while forwarding bytes to or from the transcoder.
    #[error("transcoder stream error: {0}")]
    Stream(String),
    /// The transcoder exited non-zero; carries its truncated diagnostics.
    #[error("conversion failed: {0}")]
    Transcode(String),
    /// The whole invocation exceeded its wall-clock deadline.
    #[error("conversion timed out after {0:?}")]
    Timeout(Duration),
    /// A configured input or output byte limit was exceeded.
    #[error("{0} exceeds the configured size limit")]
    TooLarge(&'static str),
}

/// Cut diagnostic text down to at most `limit` bytes without splitting a
/// UTF-8 code point.
pub fn truncate_diagnostic(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
