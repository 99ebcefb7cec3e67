use guildinfo_shared::{GuildSummary, Region, find_exact_match};
use tracing::debug;

use crate::error::LookupError;
use crate::services::gameinfo::GameInfoClient;

/// Finds the guild whose name equals `name` ignoring case.
///
/// The search endpoint matches fuzzily, so candidates are filtered to exact (case-insensitive)
/// name equality. Several equal names resolve to the first one in response order.
pub async fn resolve(
    client: &GameInfoClient,
    name: &str,
    region: Region,
) -> Result<GuildSummary, LookupError> {
    if name.trim().is_empty() {
        return Err(LookupError::EmptyInput);
    }

    let response = client.search(name, region).await?;
    debug!(
        guild = name,
        %region,
        candidates = response.guilds.len(),
        "search returned candidates"
    );

    find_exact_match(&response.guilds, name)
        .cloned()
        .ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
        })
}
