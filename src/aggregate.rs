use crate::error::SkipReason;
use crate::payload::{ParticipantRecord, RawMatchPayload};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

pub const DATE_FORMAT: &str = "%B %d, %Y %H:%M";

/// Who we are building the table for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub puuid: String,
    /// Per-season summoner id. Only used when no participant carries the puuid.
    pub summoner_id: Option<String>,
}

impl PlayerIdentity {
    pub fn from_puuid(puuid: impl Into<String>) -> Self {
        Self {
            puuid: puuid.into(),
            summoner_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatRow {
    /// 1-based position among successfully aggregated matches.
    pub index: usize,
    pub date_played: String,
    pub game_time: String,
    pub game_mode: String,
    pub result: Outcome,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda: f64,
    pub gold_earned: u32,
    pub minions_killed: u32,
    pub damage_to_champions: u32,
    pub vision_score: u32,
    pub wards_placed: u32,
    pub wards_killed: u32,
    pub vision_wards_bought: u32,
    pub vision_score_per_min: Option<f64>,
    pub summoner_icon: Option<u32>,
}

/// Picks the target player's entry, by puuid first and summoner id second.
/// Entries are compared on their raw identity fields only.
pub fn find_participant<'a>(participants: &'a [Value], identity: &PlayerIdentity) -> Option<&'a Value> {
    let field_is = |participant: &Value, key: &str, expected: &str| {
        participant
            .get(key)
            .and_then(|value| value.as_str())
            .map(|value| value == expected)
            .unwrap_or(false)
    };

    participants
        .iter()
        .find(|p| field_is(p, "puuid", &identity.puuid))
        .or_else(|| {
            let summoner_id = identity.summoner_id.as_deref()?;
            participants
                .iter()
                .find(|p| field_is(p, "summonerId", summoner_id))
        })
}

pub fn format_duration(seconds: i64) -> Result<String, SkipReason> {
    if seconds < 0 {
        return Err(SkipReason::FieldDerivation {
            field: "gameDuration",
            detail: format!("negative duration {}", seconds),
        });
    }
    Ok(format!("{}m {}s", seconds / 60, seconds % 60))
}

/// Renders `gameCreation` in UTC.
pub fn format_date(epoch_millis: i64) -> Result<String, SkipReason> {
    let created: DateTime<Utc> =
        DateTime::from_timestamp_millis(epoch_millis).ok_or_else(|| SkipReason::FieldDerivation {
            field: "gameCreation",
            detail: format!("timestamp {} is out of range", epoch_millis),
        })?;
    Ok(created.format(DATE_FORMAT).to_string())
}

pub fn kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    (f64::from(kills) + f64::from(assists)) / f64::from(deaths.max(1))
}

pub fn vision_score_per_min(vision_score: u32, duration_secs: i64) -> Option<f64> {
    if duration_secs <= 0 {
        return None;
    }
    Some(f64::from(vision_score) / (duration_secs as f64 / 60.0))
}

pub fn aggregate(
    payload: &RawMatchPayload,
    identity: &PlayerIdentity,
    index: usize,
) -> Result<MatchStatRow, SkipReason> {
    let info = &payload.info;
    let participant = find_participant(&info.participants, identity).ok_or_else(|| {
        SkipReason::ParticipantNotFound {
            puuid: identity.puuid.clone(),
        }
    })?;
    let participant = ParticipantRecord::from_value(participant)?;

    let game_duration = info.game_duration()?;
    let game_time = format_duration(game_duration)?;
    let date_played = format_date(info.game_creation()?)?;
    let result = if participant.win() {
        Outcome::Win
    } else {
        Outcome::Loss
    };

    let kills = participant.kills();
    let deaths = participant.deaths();
    let assists = participant.assists();
    let vision_score = participant.vision_score();

    Ok(MatchStatRow {
        index,
        date_played,
        game_time,
        game_mode: info.game_mode.clone(),
        result,
        kills,
        deaths,
        assists,
        kda: kda(kills, deaths, assists),
        gold_earned: participant.gold_earned(),
        minions_killed: participant.total_minions_killed(),
        damage_to_champions: participant.total_damage_dealt_to_champions(),
        vision_score,
        wards_placed: participant.wards_placed(),
        wards_killed: participant.wards_killed(),
        vision_wards_bought: participant.vision_wards_bought_in_game(),
        vision_score_per_min: vision_score_per_min(vision_score, game_duration),
        summoner_icon: participant.profile_icon(),
    })
}

/// Decodes a raw match document and aggregates it.
pub fn aggregate_value(
    payload: Value,
    identity: &PlayerIdentity,
    index: usize,
) -> Result<MatchStatRow, SkipReason> {
    let payload = RawMatchPayload::from_value(payload)
        .map_err(|err| SkipReason::MalformedPayload(err.to_string()))?;
    aggregate(&payload, identity, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(participants: Value) -> Value {
        json!({
            "metadata": {"matchId": "NA1_5000000001"},
            "info": {
                "gameDuration": 1834,
                "gameCreation": 1700000000000i64,
                "gameMode": "CLASSIC",
                "participants": participants
            }
        })
    }

    #[test]
    fn kda_guards_zero_deaths() {
        assert_eq!(kda(5, 0, 3), 8.0);
        assert_eq!(kda(2, 4, 6), 2.0);
        assert_eq!(kda(0, 0, 0), 0.0);
    }

    #[test]
    fn duration_splits_minutes_and_seconds() {
        assert_eq!(format_duration(125).unwrap(), "2m 5s");
        assert_eq!(format_duration(0).unwrap(), "0m 0s");
        assert_eq!(format_duration(1834).unwrap(), "30m 34s");
        assert!(matches!(
            format_duration(-1),
            Err(SkipReason::FieldDerivation { field: "gameDuration", .. })
        ));
    }

    #[test]
    fn date_is_rendered_in_utc() {
        assert_eq!(format_date(1700000000000).unwrap(), "November 14, 2023 22:13");
        assert_eq!(format_date(0).unwrap(), "January 01, 1970 00:00");
        assert!(matches!(
            format_date(i64::MAX),
            Err(SkipReason::FieldDerivation { field: "gameCreation", .. })
        ));
    }

    #[test]
    fn participant_found_by_puuid_before_summoner_id() {
        let participants = vec![
            json!({"puuid": "other", "summonerId": "s-1", "kills": 1}),
            json!({"puuid": "me", "summonerId": "s-2", "kills": 2}),
        ];
        let identity = PlayerIdentity {
            puuid: "me".into(),
            summoner_id: Some("s-1".into()),
        };
        assert_eq!(find_participant(&participants, &identity).unwrap()["kills"], 2);
    }

    #[test]
    fn participant_falls_back_to_summoner_id() {
        let participants = vec![json!({"summonerId": "s-1", "kills": 7})];
        let identity = PlayerIdentity {
            puuid: "me".into(),
            summoner_id: Some("s-1".into()),
        };
        assert_eq!(find_participant(&participants, &identity).unwrap()["kills"], 7);
        assert!(find_participant(&participants, &PlayerIdentity::from_puuid("me")).is_none());
    }

    #[test]
    fn aggregates_full_row() {
        let raw = payload(json!([
            {"puuid": "someone"},
            {
                "puuid": "me", "win": true, "kills": 5, "deaths": 0, "assists": 3,
                "goldEarned": 12450, "totalMinionsKilled": 201,
                "totalDamageDealtToChampions": 23011, "visionScore": 30,
                "wardsPlaced": 11, "wardsKilled": 4, "visionWardsBoughtInGame": 2,
                "profileIcon": 5367
            }
        ]));
        let row = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap();

        assert_eq!(row.index, 1);
        assert_eq!(row.date_played, "November 14, 2023 22:13");
        assert_eq!(row.game_time, "30m 34s");
        assert_eq!(row.game_mode, "CLASSIC");
        assert_eq!(row.result, Outcome::Win);
        assert_eq!(row.kda, 8.0);
        assert_eq!(row.gold_earned, 12450);
        assert_eq!(row.minions_killed, 201);
        assert_eq!(row.damage_to_champions, 23011);
        assert_eq!(row.wards_placed, 11);
        assert_eq!(row.wards_killed, 4);
        assert_eq!(row.vision_wards_bought, 2);
        assert_eq!(row.summoner_icon, Some(5367));
        let per_min = row.vision_score_per_min.unwrap();
        assert!((per_min - 30.0 / (1834.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn missing_stats_default_to_zero_and_loss() {
        let raw = payload(json!([{"puuid": "me"}]));
        let row = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 3).unwrap();
        assert_eq!(row.index, 3);
        assert_eq!(row.result, Outcome::Loss);
        assert_eq!(row.wards_placed, 0);
        assert_eq!(row.kills + row.deaths + row.assists, 0);
        assert_eq!(row.kda, 0.0);
        assert_eq!(row.summoner_icon, None);
    }

    #[test]
    fn missing_participant_is_skipped() {
        let raw = payload(json!([{"puuid": "someone"}]));
        let err = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap_err();
        assert_eq!(err, SkipReason::ParticipantNotFound { puuid: "me".into() });
    }

    #[test]
    fn zero_duration_has_no_vision_rate() {
        let mut raw = payload(json!([{"puuid": "me", "visionScore": 9}]));
        raw["info"]["gameDuration"] = json!(0);
        let row = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap();
        assert_eq!(row.game_time, "0m 0s");
        assert_eq!(row.vision_score_per_min, None);
    }

    #[test]
    fn noisy_teammate_does_not_drop_the_row() {
        let raw = payload(json!([
            {"puuid": "other", "kills": -1, "goldEarned": 1.5, "win": "yes"},
            {"puuid": "me", "kills": 5, "deaths": 0, "assists": 3}
        ]));
        let row = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap();
        assert_eq!(row.kills, 5);
        assert_eq!(row.kda, 8.0);
    }

    #[test]
    fn bad_target_stats_are_a_derivation_failure() {
        let raw = payload(json!([{"puuid": "me", "goldEarned": 1.5}]));
        let err = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap_err();
        assert!(matches!(err, SkipReason::FieldDerivation { field: "participant", .. }));
    }

    #[test]
    fn malformed_timing_is_a_derivation_failure() {
        let mut raw = payload(json!([{"puuid": "me"}]));
        raw["info"]["gameCreation"] = json!("2023-11-14");
        let err = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap_err();
        assert!(matches!(err, SkipReason::FieldDerivation { field: "gameCreation", .. }));

        let mut raw = payload(json!([{"puuid": "me"}]));
        raw["info"]["gameDuration"] = json!(12.5);
        let err = aggregate_value(raw, &PlayerIdentity::from_puuid("me"), 1).unwrap_err();
        assert!(matches!(err, SkipReason::FieldDerivation { field: "gameDuration", .. }));
    }

    #[test]
    fn undecodable_payload_is_malformed() {
        let err = aggregate_value(json!({"info": "nope"}), &PlayerIdentity::from_puuid("me"), 1)
            .unwrap_err();
        assert!(matches!(err, SkipReason::MalformedPayload(_)));
    }
}
