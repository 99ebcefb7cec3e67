use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Guild record as returned by both the search and the profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuildSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub alliance_id: Option<String>,
    #[serde(default)]
    pub kill_fame: u64,
    #[serde(default)]
    pub death_fame: u64,
    #[serde(default)]
    pub member_count: u32,
}

impl GuildSummary {
    /// Upstream reports "no alliance" either as `null` or as an empty string.
    pub fn alliance(&self) -> Option<&str> {
        self.alliance_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Body of `GET /search?q=`. Player hits share the response but are not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub guilds: Vec<GuildSummary>,
}

/// First candidate whose name equals `name` ignoring case. Response order breaks ties.
pub fn find_exact_match<'a>(
    candidates: &'a [GuildSummary],
    name: &str,
) -> Option<&'a GuildSummary> {
    let wanted = name.to_lowercase();
    candidates
        .iter()
        .find(|candidate| candidate.name.to_lowercase() == wanted)
}

/// Guild profile stamped with the region it was looked up under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGuild {
    #[serde(flatten)]
    pub summary: GuildSummary,
    pub region: Region,
}

impl ResolvedGuild {
    pub fn new(summary: GuildSummary, region: Region) -> Self {
        Self { summary, region }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTotal {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Gathering {
    pub fiber: ResourceTotal,
    pub hide: ResourceTotal,
    pub ore: ResourceTotal,
    pub rock: ResourceTotal,
    pub wood: ResourceTotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifetimeStatistics {
    #[serde(default)]
    pub fishing_fame: u64,
    pub gathering: Gathering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub guild_name: String,
    #[serde(default)]
    pub kill_fame: u64,
    #[serde(default)]
    pub fame_ratio: f64,
    #[serde(default)]
    pub average_item_power: f64,
    #[serde(default)]
    pub last_online_at: String,
    pub lifetime_statistics: LifetimeStatistics,
}

/// A resolved guild paired with its roster. Always replaced as one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildLookup {
    pub guild: ResolvedGuild,
    pub members: Vec<Member>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, name: &str) -> GuildSummary {
        GuildSummary {
            id: id.to_string(),
            name: name.to_string(),
            alliance_id: None,
            kill_fame: 0,
            death_fame: 0,
            member_count: 0,
        }
    }

    #[test]
    fn exact_match_ignores_case_but_not_substrings() {
        let candidates = vec![
            summary("1", "TestGuild Alt"),
            summary("2", "testguild"),
            summary("3", "TestGuild"),
        ];

        let found = find_exact_match(&candidates, "TESTGUILD").expect("case-insensitive match");
        assert_eq!(found.id, "2");
        assert!(find_exact_match(&candidates, "Test").is_none());
        assert!(find_exact_match(&[], "Anything").is_none());
    }

    #[test]
    fn search_response_parses_upstream_shape() {
        let payload = r#"{
            "guilds": [
                {"Id": "123", "Name": "TestGuild", "AllianceId": null,
                 "KillFame": 123456, "DeathFame": 654321, "MemberCount": 1,
                 "AllianceName": null}
            ],
            "players": []
        }"#;

        let parsed: SearchResponse = serde_json::from_str(payload).expect("parse search payload");
        assert_eq!(parsed.guilds.len(), 1);
        assert_eq!(parsed.guilds[0].id, "123");
        assert_eq!(parsed.guilds[0].kill_fame, 123_456);
        assert_eq!(parsed.guilds[0].alliance(), None);
    }

    #[test]
    fn search_response_without_guilds_is_rejected() {
        assert!(serde_json::from_str::<SearchResponse>(r#"{"players": []}"#).is_err());
        assert!(serde_json::from_str::<SearchResponse>(r#"{"guilds": {}}"#).is_err());
    }

    #[test]
    fn empty_alliance_id_reads_as_none() {
        let mut guild = summary("1", "A");
        guild.alliance_id = Some(String::new());
        assert_eq!(guild.alliance(), None);
        guild.alliance_id = Some("ally".to_string());
        assert_eq!(guild.alliance(), Some("ally"));
    }

    #[test]
    fn resolved_guild_serializes_flat_with_region() {
        let resolved = ResolvedGuild::new(summary("123", "TestGuild"), Region::Eu);
        let value = serde_json::to_value(&resolved).expect("serialize resolved guild");
        assert_eq!(value["Id"], "123");
        assert_eq!(value["Name"], "TestGuild");
        assert_eq!(value["region"], "EU");

        let back: ResolvedGuild = serde_json::from_value(value).expect("parse resolved guild");
        assert_eq!(back, resolved);
    }

    #[test]
    fn member_parses_lifetime_gathering_totals() {
        let payload = r#"{
            "Id": "m1", "Name": "Gatherer", "GuildName": "TestGuild",
            "KillFame": 10, "FameRatio": 0.5, "AverageItemPower": 1100.25,
            "LastOnlineAt": "2025-03-01T18:04:05.123456",
            "LifetimeStatistics": {
                "FishingFame": 42,
                "Gathering": {
                    "Fiber": {"Total": 1, "Royal": 0},
                    "Hide": {"Total": 2},
                    "Ore": {"Total": 3},
                    "Rock": {"Total": 4},
                    "Wood": {"Total": 5},
                    "All": {"Total": 15}
                },
                "PvE": {"Total": 0}
            }
        }"#;

        let member: Member = serde_json::from_str(payload).expect("parse member");
        assert_eq!(member.lifetime_statistics.fishing_fame, 42);
        assert_eq!(member.lifetime_statistics.gathering.rock.total, 4);
        assert_eq!(member.last_online_at, "2025-03-01T18:04:05.123456");
    }

    #[test]
    fn gathering_counters_pass_through_at_full_width() {
        let payload = format!(
            r#"{{"Fiber": {{"Total": {max}}}, "Hide": {{"Total": 1}}, "Ore": {{"Total": {max}}},
                "Rock": {{"Total": 0}}, "Wood": {{"Total": 2}}}}"#,
            max = u64::MAX
        );

        let gathering: Gathering = serde_json::from_str(&payload).expect("parse gathering");
        assert_eq!(gathering.fiber.total, u64::MAX);
        assert_eq!(gathering.ore.total, u64::MAX);

        let echoed = serde_json::to_value(gathering).expect("serialize gathering");
        assert_eq!(echoed["Fiber"]["Total"], u64::MAX);
        assert_eq!(echoed["Wood"]["Total"], 2);
    }

    #[test]
    fn member_missing_gathering_block_is_rejected() {
        let payload = r#"{"Id": "m1", "Name": "X", "LifetimeStatistics": {"FishingFame": 1}}"#;
        assert!(serde_json::from_str::<Member>(payload).is_err());
    }
}
