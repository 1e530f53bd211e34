use crate::error::SkipReason;
use serde::Deserialize;
use serde_json::Value;

/// The parts of a match-v5 document the aggregator reads.
///
/// Only `info.gameMode` and the `info.participants` array are needed to
/// decode. Timing fields and participants stay raw until the target player
/// has been picked, so a bad value elsewhere in the match cannot hide a
/// clean row.
#[derive(Deserialize, Debug, Clone)]
pub struct RawMatchPayload {
    pub info: MatchInfo,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Seconds.
    #[serde(default)]
    game_duration: Value,
    /// Epoch milliseconds.
    #[serde(default)]
    game_creation: Value,
    pub game_mode: String,
    pub participants: Vec<Value>,
}

impl MatchInfo {
    pub fn game_duration(&self) -> Result<i64, SkipReason> {
        integer_field("gameDuration", &self.game_duration)
    }

    pub fn game_creation(&self) -> Result<i64, SkipReason> {
        integer_field("gameCreation", &self.game_creation)
    }
}

fn integer_field(field: &'static str, value: &Value) -> Result<i64, SkipReason> {
    value.as_i64().ok_or_else(|| SkipReason::FieldDerivation {
        field,
        detail: match value {
            Value::Null => "missing".to_string(),
            other => format!("expected an integer, got {}", other),
        },
    })
}

/// One combatant's stats. Every stat is optional on the wire.
///
/// | field | default |
/// |---|---|
/// | `win` | `false` |
/// | `kills`, `deaths`, `assists` | `0` |
/// | `goldEarned`, `totalMinionsKilled`, `totalDamageDealtToChampions` | `0` |
/// | `visionScore`, `wardsPlaced`, `wardsKilled`, `visionWardsBoughtInGame` | `0` |
/// | `profileIcon` | none |
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub puuid: Option<String>,
    pub summoner_id: Option<String>,
    win: Option<bool>,
    kills: Option<u32>,
    deaths: Option<u32>,
    assists: Option<u32>,
    gold_earned: Option<u32>,
    total_minions_killed: Option<u32>,
    total_damage_dealt_to_champions: Option<u32>,
    vision_score: Option<u32>,
    wards_placed: Option<u32>,
    wards_killed: Option<u32>,
    vision_wards_bought_in_game: Option<u32>,
    profile_icon: Option<u32>,
}

impl RawMatchPayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl ParticipantRecord {
    /// Decodes the selected participant's stats.
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        Self::deserialize(value).map_err(|err| SkipReason::FieldDerivation {
            field: "participant",
            detail: err.to_string(),
        })
    }

    pub fn win(&self) -> bool {
        self.win.unwrap_or(false)
    }

    pub fn kills(&self) -> u32 {
        self.kills.unwrap_or(0)
    }

    pub fn deaths(&self) -> u32 {
        self.deaths.unwrap_or(0)
    }

    pub fn assists(&self) -> u32 {
        self.assists.unwrap_or(0)
    }

    pub fn gold_earned(&self) -> u32 {
        self.gold_earned.unwrap_or(0)
    }

    pub fn total_minions_killed(&self) -> u32 {
        self.total_minions_killed.unwrap_or(0)
    }

    pub fn total_damage_dealt_to_champions(&self) -> u32 {
        self.total_damage_dealt_to_champions.unwrap_or(0)
    }

    pub fn vision_score(&self) -> u32 {
        self.vision_score.unwrap_or(0)
    }

    pub fn wards_placed(&self) -> u32 {
        self.wards_placed.unwrap_or(0)
    }

    pub fn wards_killed(&self) -> u32 {
        self.wards_killed.unwrap_or(0)
    }

    pub fn vision_wards_bought_in_game(&self) -> u32 {
        self.vision_wards_bought_in_game.unwrap_or(0)
    }

    pub fn profile_icon(&self) -> Option<u32> {
        self.profile_icon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_and_null_stats_use_defaults() {
        let participant = ParticipantRecord::from_value(&json!({
            "puuid": "p1", "kills": 3, "wardsPlaced": null
        }))
        .unwrap();
        assert_eq!(participant.kills(), 3);
        assert_eq!(participant.wards_placed(), 0);
        assert_eq!(participant.deaths(), 0);
        assert!(!participant.win());
        assert_eq!(participant.profile_icon(), None);
    }

    #[test]
    fn bad_participant_counter_is_a_derivation_failure() {
        let err = ParticipantRecord::from_value(&json!({"puuid": "p1", "kills": -1})).unwrap_err();
        assert!(matches!(err, SkipReason::FieldDerivation { field: "participant", .. }));
    }

    #[test]
    fn payload_requires_info_and_participants() {
        let missing_info = RawMatchPayload::from_value(json!({"metadata": {"matchId": "NA1_1"}}));
        assert!(missing_info.is_err());

        let bad_participants = RawMatchPayload::from_value(json!({
            "info": {"gameMode": "CLASSIC", "participants": 3}
        }));
        assert!(bad_participants.is_err());
    }

    #[test]
    fn timing_fields_are_checked_on_read() {
        let payload = RawMatchPayload::from_value(json!({
            "info": {"gameCreation": "yesterday", "gameMode": "CLASSIC", "participants": []}
        }))
        .unwrap();
        assert!(matches!(
            payload.info.game_duration(),
            Err(SkipReason::FieldDerivation { field: "gameDuration", detail }) if detail == "missing"
        ));
        assert!(matches!(
            payload.info.game_creation(),
            Err(SkipReason::FieldDerivation { field: "gameCreation", .. })
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload = RawMatchPayload::from_value(json!({
            "metadata": {"matchId": "NA1_1", "participants": ["p1"]},
            "info": {
                "gameDuration": 1800,
                "gameCreation": 1700000000000i64,
                "gameMode": "CLASSIC",
                "queueId": 420,
                "participants": [{"puuid": "p1", "championName": "Sett", "challenges": {}}]
            }
        }))
        .unwrap();
        assert_eq!(payload.info.game_duration().unwrap(), 1800);
        assert_eq!(payload.info.participants.len(), 1);
    }
}
