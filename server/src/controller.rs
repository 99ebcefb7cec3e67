use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::Utc;
use guildinfo_shared::{
    AddressState, GuildLookup, LookupSnapshot, Notification, Region, SearchOutcome,
};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::services::gameinfo::GameInfoClient;
use crate::services::{aggregator, resolver};
use crate::state::ObservabilityCounters;

/// Pre-serialized event, serialized once and shared by all SSE clients.
#[derive(Debug, Clone)]
pub enum LookupEvent {
    Snapshot { seq: u64, json: Arc<Bytes> },
    Notification { seq: u64, json: Arc<Bytes> },
}

/// How a search treats the shareable address.
enum AddressUpdate {
    /// Rewrite it after a successful search.
    WriteOnSuccess,
    /// Take over an address loaded from outside when the search starts loading.
    Adopt(AddressState),
}

#[derive(Debug, Default)]
struct ControllerState {
    snapshot: LookupSnapshot,
    snapshot_json: Arc<Bytes>,
    address: AddressState,
}

/// Owns the lookup state and drives resolve → aggregate for each search.
///
/// Searches are never queued or cancelled. Each one takes the next sequence number, and a
/// completion only lands if no newer search was issued meanwhile, so the latest request wins
/// regardless of which response arrives last.
#[derive(Clone)]
pub struct SearchController {
    client: GameInfoClient,
    state: Arc<RwLock<ControllerState>>,
    issued: Arc<AtomicU64>,
    event_tx: broadcast::Sender<LookupEvent>,
    observability: Arc<ObservabilityCounters>,
}

impl SearchController {
    pub fn new(
        client: GameInfoClient,
        observability: Arc<ObservabilityCounters>,
        broadcast_buffer: usize,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(broadcast_buffer.max(1));
        let mut state = ControllerState::default();
        state.snapshot.timestamp = Utc::now().to_rfc3339();
        state.snapshot_json = serialize_json(&state.snapshot, "initial snapshot")
            .unwrap_or_else(|| Arc::new(Bytes::new()));
        Self {
            client,
            state: Arc::new(RwLock::new(state)),
            issued: Arc::new(AtomicU64::new(0)),
            event_tx,
            observability,
        }
    }

    pub async fn snapshot(&self) -> LookupSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn snapshot_json(&self) -> (u64, Arc<Bytes>) {
        let state = self.state.read().await;
        (state.snapshot.seq, Arc::clone(&state.snapshot_json))
    }

    pub async fn address(&self) -> AddressState {
        self.state.read().await.address.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LookupEvent> {
        self.event_tx.subscribe()
    }

    /// Highest sequence number handed out so far.
    pub fn latest_seq(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }

    /// User-submitted search. On success the address is rewritten to reproduce it.
    pub async fn search(&self, name: &str, region: Region) -> SearchOutcome {
        self.run_search(name, region, AddressUpdate::WriteOnSuccess).await
    }

    /// Load-time entry point: opens the session at `address` and searches for what it names.
    ///
    /// The address already describes the search, so it is adopted as-is rather than rewritten,
    /// and only while this search still holds the newest sequence number.
    /// Returns `None` when the address names no guild.
    pub async fn load_from_address(&self, address: &AddressState) -> Option<SearchOutcome> {
        let request = address.search()?;
        info!(
            guild = %request.guild,
            region = %request.region,
            "searching from loaded address"
        );
        Some(
            self.run_search(
                &request.guild,
                request.region,
                AddressUpdate::Adopt(address.clone()),
            )
            .await,
        )
    }

    async fn run_search(
        &self,
        name: &str,
        region: Region,
        address: AddressUpdate,
    ) -> SearchOutcome {
        if name.trim().is_empty() {
            self.observability.record_search_ignored();
            debug!("ignoring search with empty guild name");
            return SearchOutcome::Ignored;
        }

        let seq = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        self.observability.record_search_started();
        info!(seq, guild = name, %region, "guild search started");
        let write_address = match address {
            AddressUpdate::WriteOnSuccess => {
                self.mark_loading(seq, None).await;
                true
            }
            AddressUpdate::Adopt(loaded) => {
                self.mark_loading(seq, Some(loaded)).await;
                false
            }
        };

        let result = self.lookup(name, region).await;
        self.complete(seq, name, region, result, write_address).await
    }

    async fn lookup(&self, name: &str, region: Region) -> Result<GuildLookup, LookupError> {
        let summary = resolver::resolve(&self.client, name, region).await?;
        Ok(aggregator::aggregate(&self.client, &summary.id, region).await?)
    }

    async fn mark_loading(&self, seq: u64, adopt: Option<AddressState>) {
        let mut state = self.state.write().await;
        // A newer search may already have started (or finished); it owns the flag then.
        if self.issued.load(Ordering::Acquire) != seq {
            return;
        }
        if let Some(address) = adopt {
            state.snapshot.address = address.to_query_string();
            state.address = address;
        }
        state.snapshot.seq = seq;
        state.snapshot.loading = true;
        state.snapshot.timestamp = Utc::now().to_rfc3339();
        self.publish_snapshot(&mut state);
    }

    async fn complete(
        &self,
        seq: u64,
        name: &str,
        region: Region,
        result: Result<GuildLookup, LookupError>,
        write_address: bool,
    ) -> SearchOutcome {
        let mut state = self.state.write().await;

        if self.issued.load(Ordering::Acquire) != seq {
            self.observability.record_search_superseded();
            match &result {
                Ok(_) => debug!(seq, guild = name, "discarding superseded search result"),
                Err(e) => {
                    debug!(seq, guild = name, error = %e, "discarding superseded search failure")
                }
            }
            return SearchOutcome::Superseded { seq };
        }

        state.snapshot.seq = seq;
        state.snapshot.loading = false;
        state.snapshot.timestamp = Utc::now().to_rfc3339();

        match result {
            Ok(lookup) => {
                self.observability.record_search_succeeded();
                info!(
                    seq,
                    guild = %lookup.guild.summary.name,
                    guild_id = %lookup.guild.summary.id,
                    %region,
                    members = lookup.members.len(),
                    "guild search succeeded"
                );
                if write_address {
                    state.address = AddressState::for_search(name, region);
                    state.snapshot.address = state.address.to_query_string();
                }
                state.snapshot.result = Some(lookup);
                state.snapshot.notification = None;
                self.publish_snapshot(&mut state);
            }
            Err(e) => {
                let kind = e.kind();
                self.observability.record_search_failed(kind);
                warn!(seq, guild = name, %region, error = %e, "guild search failed");
                let notification = Notification::new(seq, kind);
                state.snapshot.result = None;
                state.snapshot.notification = Some(notification.clone());
                self.publish_snapshot(&mut state);
                if let Some(json) = serialize_json(&notification, "notification") {
                    let _ = self.event_tx.send(LookupEvent::Notification { seq, json });
                }
            }
        }

        SearchOutcome::Applied { seq }
    }

    fn publish_snapshot(&self, state: &mut ControllerState) {
        let seq = state.snapshot.seq;
        let Some(json) = serialize_json(&state.snapshot, "snapshot") else {
            return;
        };
        state.snapshot_json = Arc::clone(&json);
        // No subscribers is fine; the snapshot stays readable.
        let _ = self.event_tx.send(LookupEvent::Snapshot { seq, json });
    }
}

fn serialize_json<T: serde::Serialize>(value: &T, label: &str) -> Option<Arc<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(Arc::new(Bytes::from(bytes))),
        Err(e) => {
            warn!(error = %e, "failed to serialize {label}");
            None
        }
    }
}
