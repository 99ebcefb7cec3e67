//! In-process stand-in for the gameinfo API, reached through the relay prefix.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guildinfo_shared::{
    Gathering, GuildSummary, LifetimeStatistics, Member, Region, ResourceTotal,
};
use reqwest::Url;

use crate::config::{GAMEINFO_API_PATH, UpstreamConfig};

#[derive(Default)]
struct FakeData {
    guilds: Vec<(Region, GuildSummary)>,
    members: HashMap<String, Vec<Member>>,
    failures: Vec<(String, u16)>,
    malformed: Vec<String>,
    search_delays: HashMap<String, Duration>,
    path_delays: Vec<(String, Duration)>,
    requests: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeUpstream {
    data: Arc<Mutex<FakeData>>,
}

impl FakeUpstream {
    fn with_data<R>(&self, f: impl FnOnce(&mut FakeData) -> R) -> R {
        let mut data = self.data.lock().expect("fake upstream lock");
        f(&mut data)
    }

    pub fn add_guild(&self, region: Region, guild: GuildSummary) {
        self.with_data(|data| data.guilds.push((region, guild)));
    }

    pub fn set_members(&self, guild_id: &str, members: Vec<Member>) {
        self.with_data(|data| {
            data.members.insert(guild_id.to_string(), members);
        });
    }

    /// Any request whose path ends with `suffix` answers with `status`.
    pub fn fail_path_suffix(&self, suffix: &str, status: u16) {
        self.with_data(|data| data.failures.push((suffix.to_string(), status)));
    }

    pub fn malformed_path_suffix(&self, suffix: &str) {
        self.with_data(|data| data.malformed.push(suffix.to_string()));
    }

    /// Holds search responses for `query` back by `delay`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.with_data(|data| {
            data.search_delays.insert(query.to_lowercase(), delay);
        });
    }

    /// Holds responses for any path ending with `suffix` back by `delay`.
    pub fn delay_path_suffix(&self, suffix: &str, delay: Duration) {
        self.with_data(|data| data.path_delays.push((suffix.to_string(), delay)));
    }

    /// Target URLs requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.with_data(|data| data.requests.clone())
    }
}

pub fn guild(id: &str, name: &str, member_count: u32) -> GuildSummary {
    GuildSummary {
        id: id.to_string(),
        name: name.to_string(),
        alliance_id: None,
        kill_fame: 123_456,
        death_fame: 654_321,
        member_count,
    }
}

pub fn member(id: &str, name: &str, guild_name: &str, fiber: u64) -> Member {
    Member {
        id: id.to_string(),
        name: name.to_string(),
        guild_name: guild_name.to_string(),
        kill_fame: 1_000,
        fame_ratio: 1.5,
        average_item_power: 1_050.0,
        last_online_at: "2025-01-01T00:00:00Z".to_string(),
        lifetime_statistics: LifetimeStatistics {
            fishing_fame: 10,
            gathering: Gathering {
                fiber: ResourceTotal { total: fiber },
                ..Gathering::default()
            },
        },
    }
}

#[derive(serde::Deserialize)]
struct RelayQuery {
    url: String,
}

pub async fn spawn_fake_upstream(
    fake: FakeUpstream,
) -> (UpstreamConfig, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/relay", axum::routing::get(relay))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr: SocketAddr = listener.local_addr().expect("fake upstream address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake upstream");
    });
    let upstream = UpstreamConfig {
        relay: Some(format!("http://{addr}/relay?url=")),
        ..UpstreamConfig::default()
    };
    (upstream, handle)
}

fn region_for_host(host: &str) -> Option<Region> {
    let variant = host.strip_prefix("gameinfo")?.split('.').next()?;
    Region::ALL
        .into_iter()
        .find(|region| region.host_variant() == variant)
}

async fn relay(State(fake): State<FakeUpstream>, Query(query): Query<RelayQuery>) -> Response {
    let Ok(target) = Url::parse(&query.url) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let path = target.path().to_string();
    let (delay, failure, malformed) = fake.with_data(|data| {
        data.requests.push(target.to_string());
        (
            data.path_delays
                .iter()
                .find(|(suffix, _)| path.ends_with(suffix.as_str()))
                .map(|(_, delay)| *delay),
            data.failures
                .iter()
                .find(|(suffix, _)| path.ends_with(suffix.as_str()))
                .map(|(_, status)| *status),
            data.malformed.iter().any(|suffix| path.ends_with(suffix.as_str())),
        )
    });
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "upstream failure").into_response();
    }
    if malformed {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }

    let Some(region) = target.host_str().and_then(region_for_host) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(rest) = path.strip_prefix(GAMEINFO_API_PATH) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["search"] => {
            let q = target
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            let delay = fake.with_data(|data| data.search_delays.get(&q.to_lowercase()).copied());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let needle = q.to_lowercase();
            let guilds: Vec<GuildSummary> = fake.with_data(|data| {
                data.guilds
                    .iter()
                    .filter(|(r, g)| *r == region && g.name.to_lowercase().contains(&needle))
                    .map(|(_, g)| g.clone())
                    .collect()
            });
            axum::Json(serde_json::json!({ "guilds": guilds, "players": [] })).into_response()
        }
        ["guilds", id] => {
            let found = fake.with_data(|data| {
                data.guilds
                    .iter()
                    .find(|(r, g)| *r == region && g.id == *id)
                    .map(|(_, g)| g.clone())
            });
            match found {
                Some(guild) => axum::Json(guild).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            }
        }
        ["guilds", id, "members"] => {
            let members = fake.with_data(|data| data.members.get(*id).cloned().unwrap_or_default());
            axum::Json(members).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
