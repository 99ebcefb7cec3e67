//! Failure taxonomy for a single guild lookup.
//!
//! Every upstream problem, whether network, status or payload shape, collapses into
//! [`TransportError`]; callers only distinguish it from a search that found no guild.
use guildinfo_shared::ErrorKind;
use thiserror::Error;

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream status {status} from {url}; body preview: {preview}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        preview: String,
    },

    #[error("failed to decode payload from {url}; body preview: {preview}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
        preview: String,
    },

    #[error("invalid upstream url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("guild name is empty")]
    EmptyInput,

    #[error("no guild named {name:?} in search results")]
    NotFound { name: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::EmptyInput => ErrorKind::EmptyInput,
            LookupError::NotFound { .. } => ErrorKind::NotFound,
            LookupError::Transport(_) => ErrorKind::TransportError,
        }
    }
}

pub(crate) fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}
