//! Failure modes of a single probe.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong between sending the GET and holding a decoded
/// JSON document. Converted into `ProbeResult::Failure` at the prober boundary.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Malformed URL, DNS, connect or TLS failure, or a broken body stream.
    #[error("network error: {0}")]
    Network(String),

    /// No response headers within the window, or the body stalled for longer.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The body is not valid JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Network,
    Timeout,
    Http,
    Parse,
}

impl ProbeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProbeError::Network(_) => FailureKind::Network,
            ProbeError::Timeout(_) => FailureKind::Timeout,
            ProbeError::Http(_) => FailureKind::Http,
            ProbeError::Parse(_) => FailureKind::Parse,
        }
    }

    /// Classify a transport error. `timeout` is only used for the message.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ProbeError::Timeout(timeout);
        }
        if let Some(status) = err.status() {
            return ProbeError::Http(status.to_string());
        }
        ProbeError::Network(error_chain(&err))
    }
}

/// `reqwest` keeps the useful part ("Connection refused", certificate
/// problems) in the source chain, so flatten it into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        let part = s.to_string();
        if !msg.contains(&part) {
            msg.push_str(": ");
            msg.push_str(&part);
        }
        source = s.source();
    }
    msg
}
