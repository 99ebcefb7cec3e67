use serde::{Deserialize, Serialize};

use crate::region::Region;

pub const GUILD_PARAM: &str = "guild";
pub const SERVER_PARAM: &str = "server";

/// Shareable query-parameter state (`?guild=..&server=..`).
///
/// Stands in for the page address: it is read once when a session opens and rewritten after
/// every successful search, so the encoded form reproduces the result it was written for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressState {
    params: Vec<(String, String)>,
}

/// A search derived from address state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSearch {
    pub guild: String,
    pub region: Region,
}

impl AddressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { params }
    }

    /// State written after a successful search.
    pub fn for_search(guild: &str, region: Region) -> Self {
        let mut state = Self::new();
        state.set(GUILD_PARAM, guild);
        state.set(SERVER_PARAM, region.as_str());
        state
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.params.push((key.to_string(), value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn guild(&self) -> Option<&str> {
        self.get(GUILD_PARAM)
    }

    pub fn server(&self) -> Option<&str> {
        self.get(SERVER_PARAM)
    }

    /// The search this address asks for, if it names a guild.
    ///
    /// A missing `server` falls back to the selector default (EU); an unrecognized one to the
    /// default host (NA).
    pub fn search(&self) -> Option<AddressSearch> {
        let guild = self.guild().filter(|g| !g.trim().is_empty())?;
        let region = match self.server() {
            Some(raw) => Region::from_selector_or_default_host(raw),
            None => Region::default(),
        };
        Some(AddressSearch {
            guild: guild.to_string(),
            region,
        })
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
