use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use guildinfo_shared::{AddressState, SearchReceipt, SearchSubmission};
use tracing::error;

use crate::state::{AppState, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
const MAX_GUILD_NAME_LEN: usize = 64;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.controller.snapshot().await;
    Json(serde_json::json!({
        "status": "ok",
        "loading": snapshot.loading,
        "has_result": snapshot.result.is_some(),
        "seq": state.controller.latest_seq(),
    }))
}

/// Current published lookup state, serialized once per change.
pub async fn get_lookup(State(state): State<AppState>) -> Response {
    let (_, json) = state.controller.snapshot_json().await;
    json_bytes_response((*json).clone())
}

pub async fn get_address(State(state): State<AppState>) -> Json<serde_json::Value> {
    let address = state.controller.address().await;
    Json(serde_json::json!({ "query": address.to_query_string() }))
}

/// Runs a search to completion and reports whether it was the one that landed.
///
/// The search is spawned so a client that disconnects mid-flight cannot strand the loading flag.
pub async fn post_search(
    State(state): State<AppState>,
    Json(submission): Json<SearchSubmission>,
) -> Result<Json<SearchReceipt>, StatusCode> {
    if submission.guild.chars().count() > MAX_GUILD_NAME_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    let region = submission.region();
    let controller = state.controller.clone();
    let task = tokio::spawn(async move { controller.search(&submission.guild, region).await });
    let outcome = task.await.map_err(|e| {
        error!(error = %e, "search task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SearchReceipt {
        outcome,
        snapshot: state.controller.snapshot().await,
    }))
}

/// Opens the session at the given address (`?guild=..&server=..`) and searches from it.
pub async fn post_load(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, StatusCode> {
    let address = AddressState::from_query(query.as_deref().unwrap_or_default());
    if address.search().is_none() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let controller = state.controller.clone();
    let task = tokio::spawn(async move { controller.load_from_address(&address).await });
    let outcome = task.await.map_err(|e| {
        error!(error = %e, "load task failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let Some(outcome) = outcome else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    Ok(Json(SearchReceipt {
        outcome,
        snapshot: state.controller.snapshot().await,
    })
    .into_response())
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let loading = state.controller.snapshot().await.loading;
    let body = render_prometheus_metrics(loading, state.observability.snapshot());

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(loading: bool, observability: ObservabilitySnapshot) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP guildinfo_search_loading Whether the newest search is still in flight (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE guildinfo_search_loading gauge");
    let _ = writeln!(body, "guildinfo_search_loading {}", u8::from(loading));

    let counters = [
        (
            "guildinfo_searches_started_total",
            "Total searches issued upstream.",
            observability.searches_started_total,
        ),
        (
            "guildinfo_searches_succeeded_total",
            "Total searches that published a guild and roster.",
            observability.searches_succeeded_total,
        ),
        (
            "guildinfo_searches_not_found_total",
            "Total searches with no exact guild name match.",
            observability.searches_not_found_total,
        ),
        (
            "guildinfo_searches_transport_errors_total",
            "Total searches failed by network or payload errors.",
            observability.searches_transport_errors_total,
        ),
        (
            "guildinfo_searches_ignored_total",
            "Total search submissions ignored for an empty name.",
            observability.searches_ignored_total,
        ),
        (
            "guildinfo_searches_superseded_total",
            "Total search completions discarded because a newer search was issued.",
            observability.searches_superseded_total,
        ),
    ];
    for (name, help, value) in counters {
        let _ = writeln!(body, "# HELP {name} {help}");
        let _ = writeln!(body, "# TYPE {name} counter");
        let _ = writeln!(body, "{name} {value}");
    }

    body
}

fn json_bytes_response(body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
