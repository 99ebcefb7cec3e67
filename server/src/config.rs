use std::time::Duration;

use guildinfo_shared::AddressState;

pub const DEFAULT_GAMEINFO_HOST: &str = "albiononline.com";
pub const DEFAULT_GAMEINFO_SCHEME: &str = "https";
pub const GAMEINFO_API_PATH: &str = "/api/gameinfo";

pub const SSE_KEEPALIVE_SECS: u64 = 15;
pub const DEFAULT_BROADCAST_BUFFER: usize = 256;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Where and how the gameinfo API is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub scheme: String,
    pub host: String,
    /// Pass-through relay prepended to every target URL, e.g. `https://corsproxy.io/?url=`.
    pub relay: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_GAMEINFO_SCHEME.to_string(),
            host: DEFAULT_GAMEINFO_HOST.to_string(),
            relay: None,
        }
    }
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        Self {
            scheme: gameinfo_scheme(),
            host: gameinfo_host(),
            relay: gameinfo_relay(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn server_port() -> u16 {
    std::env::var("GUILDINFO_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn gameinfo_host() -> String {
    non_empty_env("GAMEINFO_HOST")
        .map(|host| host.trim_matches('.').to_ascii_lowercase())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_GAMEINFO_HOST.to_string())
}

pub fn gameinfo_scheme() -> String {
    non_empty_env("GAMEINFO_SCHEME")
        .map(|scheme| scheme.to_ascii_lowercase())
        .filter(|scheme| matches!(scheme.as_str(), "http" | "https"))
        .unwrap_or_else(|| DEFAULT_GAMEINFO_SCHEME.to_string())
}

pub fn gameinfo_relay() -> Option<String> {
    non_empty_env("GAMEINFO_RELAY_URL")
}

pub fn sse_broadcast_buffer() -> usize {
    std::env::var("SSE_BROADCAST_BUFFER")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_BROADCAST_BUFFER)
}

/// Overall request timeout. Unset means searches wait on upstream indefinitely.
pub fn upstream_http_timeout() -> Option<Duration> {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

/// Address loaded once at startup, e.g. `guild=Foo&server=Asia`.
pub fn initial_address() -> Option<AddressState> {
    non_empty_env("GUILDINFO_INITIAL_ADDRESS")
        .map(|query| AddressState::from_query(&query))
        .filter(|address| !address.is_empty())
}
