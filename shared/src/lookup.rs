use serde::{Deserialize, Serialize};

use crate::guild::GuildLookup;
use crate::region::Region;

/// Why a search ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    NotFound,
    TransportError,
}

impl ErrorKind {
    /// Generic user-facing text for the failure.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "Enter a guild name.",
            ErrorKind::NotFound => "Guild not found.",
            ErrorKind::TransportError => "Failed to fetch guild info.",
        }
    }
}

/// One-shot failure notice raised by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub seq: u64,
    pub kind: ErrorKind,
    pub message: String,
}

impl Notification {
    pub fn new(seq: u64, kind: ErrorKind) -> Self {
        Self {
            seq,
            kind,
            message: kind.message().to_string(),
        }
    }
}

/// State published by the search controller for the display layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LookupSnapshot {
    /// Sequence number of the search that last changed this snapshot.
    pub seq: u64,
    pub loading: bool,
    pub result: Option<GuildLookup>,
    pub notification: Option<Notification>,
    /// Shareable query string for `result`.
    pub address: String,
    pub timestamp: String,
}

/// Body of a search submission. `server` defaults to EU when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSubmission {
    #[serde(default)]
    pub guild: String,
    #[serde(default)]
    pub server: Option<String>,
}

impl SearchSubmission {
    pub fn region(&self) -> Region {
        self.server
            .as_deref()
            .map(Region::from_selector_or_default_host)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Empty name; nothing changed.
    Ignored,
    /// Completion was the newest issued search and was published.
    Applied { seq: u64 },
    /// A newer search was issued before this one completed; its result was dropped.
    Superseded { seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReceipt {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    pub snapshot: LookupSnapshot,
}
