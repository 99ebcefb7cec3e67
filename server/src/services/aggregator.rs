use guildinfo_shared::{GuildLookup, Region, ResolvedGuild};
use tracing::debug;

use crate::error::TransportError;
use crate::services::gameinfo::GameInfoClient;

/// Fetches profile and roster for `id` concurrently and pairs them.
///
/// Fails fast: the first failing request drops the other, and no half result is returned.
/// The profile is stamped with `region` since upstream does not echo it.
pub async fn aggregate(
    client: &GameInfoClient,
    id: &str,
    region: Region,
) -> Result<GuildLookup, TransportError> {
    let (profile, members) =
        tokio::try_join!(client.guild(id, region), client.members(id, region))?;

    debug!(
        guild_id = id,
        %region,
        members = members.len(),
        "guild profile and roster fetched"
    );

    Ok(GuildLookup {
        guild: ResolvedGuild::new(profile, region),
        members,
    })
}
