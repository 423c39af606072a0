use serde::{Deserialize, Serialize};

/// Lane sentinel used when the source role field is empty.
pub const UNKNOWN_LANE: &str = "UNKNOWN";

// Account V1 response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

impl AccountDto {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }

    /// First eight characters of the PUUID, for display only.
    pub fn masked_puuid(&self) -> String {
        let head: String = self.puuid.chars().take(8).collect();
        format!("{head}…")
    }
}

// Match V5 response, reduced to the fields the engine reads.
#[derive(Debug, Deserialize)]
pub struct MatchDto {
    pub info: MatchInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub game_version: String,
    #[serde(default)]
    pub game_start_timestamp: Option<i64>,
    #[serde(default)]
    pub game_creation: Option<i64>,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    pub win: bool,
    #[serde(default)]
    pub team_position: String, // TOP, JUNGLE, MIDDLE, BOTTOM, UTILITY
    #[serde(default)]
    pub individual_position: String,
}

/// The only data retained per match: everything else in the raw match
/// record is discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlice {
    pub champion_name: String,
    pub win: bool,
    pub lane: String,
    pub patch: Option<String>,
    pub timestamp_ms: Option<i64>,
}

impl PlayerSlice {
    /// Extracts the target player's slice from a full match record.
    /// Returns `None` when the player is not among the participants.
    pub fn from_match(data: &MatchDto, puuid: &str) -> Option<PlayerSlice> {
        let p = data.info.participants.iter().find(|p| p.puuid == puuid)?;

        let role = if !p.team_position.is_empty() {
            p.team_position.as_str()
        } else {
            p.individual_position.as_str()
        };
        let lane = if role.is_empty() {
            UNKNOWN_LANE.to_string()
        } else {
            role.to_uppercase()
        };

        Some(PlayerSlice {
            champion_name: p.champion_name.clone(),
            win: p.win,
            lane,
            patch: patch_from_game_version(&data.info.game_version),
            timestamp_ms: data.info.game_start_timestamp.or(data.info.game_creation),
        })
    }
}

/// `"14.20.634.2432"` → `"14.20"`. Returns `None` when the version
/// string does not carry two numeric components.
pub fn patch_from_game_version(version: &str) -> Option<String> {
    let mut parts = version.split('.');
    let major = parts.next()?;
    let minor = parts.next()?;
    if major.parse::<u32>().is_err() || minor.parse::<u32>().is_err() {
        return None;
    }
    Some(format!("{major}.{minor}"))
}
