use guildinfo_shared::{GuildSummary, Member, Region, SearchResponse};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{GAMEINFO_API_PATH, UpstreamConfig};
use crate::error::{TransportError, body_preview};

/// HTTP access to the region-specific gameinfo API.
#[derive(Debug, Clone)]
pub struct GameInfoClient {
    http: reqwest::Client,
    upstream: UpstreamConfig,
}

impl GameInfoClient {
    pub fn new(http: reqwest::Client, upstream: UpstreamConfig) -> Self {
        Self { http, upstream }
    }

    /// `<scheme>://gameinfo<suffix>.<host>/api/gameinfo`
    pub fn base_url(&self, region: Region) -> String {
        format!(
            "{}://gameinfo{}.{}{}",
            self.upstream.scheme,
            region.host_variant(),
            self.upstream.host,
            GAMEINFO_API_PATH
        )
    }

    pub fn search_url(&self, name: &str, region: Region) -> Result<Url, TransportError> {
        let mut url = self.endpoint(region, &["search"])?;
        url.query_pairs_mut().append_pair("q", name);
        Ok(url)
    }

    pub fn guild_url(&self, id: &str, region: Region) -> Result<Url, TransportError> {
        self.endpoint(region, &["guilds", id])
    }

    pub fn members_url(&self, id: &str, region: Region) -> Result<Url, TransportError> {
        self.endpoint(region, &["guilds", id, "members"])
    }

    pub async fn search(
        &self,
        name: &str,
        region: Region,
    ) -> Result<SearchResponse, TransportError> {
        let url = self.search_url(name, region)?;
        self.get_json(&url).await
    }

    pub async fn guild(&self, id: &str, region: Region) -> Result<GuildSummary, TransportError> {
        let url = self.guild_url(id, region)?;
        self.get_json(&url).await
    }

    pub async fn members(&self, id: &str, region: Region) -> Result<Vec<Member>, TransportError> {
        let url = self.members_url(id, region)?;
        self.get_json(&url).await
    }

    fn endpoint(&self, region: Region, segments: &[&str]) -> Result<Url, TransportError> {
        let base = self.base_url(region);
        let mut url = Url::parse(&base).map_err(|e| TransportError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        {
            let Ok(mut path) = url.path_segments_mut() else {
                return Err(TransportError::InvalidUrl {
                    url: base,
                    reason: "url cannot carry path segments".to_string(),
                });
            };
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// URL actually requested: the target itself, or the relay prefix with the target encoded.
    pub fn request_url(&self, target: &Url) -> String {
        match self.upstream.relay.as_deref() {
            Some(relay) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(target.as_str().as_bytes()).collect();
                format!("{relay}{encoded}")
            }
            None => target.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, target: &Url) -> Result<T, TransportError> {
        let request_url = self.request_url(target);
        debug!(url = %target, "gameinfo request");

        let resp = self
            .http
            .get(&request_url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: target.to_string(),
                source,
            })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                url: target.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                url: target.to_string(),
                status,
                preview: body_preview(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            url: target.to_string(),
            source,
            preview: body_preview(&bytes),
        })
    }
}
