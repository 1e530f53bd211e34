use crate::error::ResolveError;
use serde_json::Value;

/// One entry of a player's match history as handed out by a history source.
///
/// Match-v5 lists are plain `"NA1_4567890123"` strings, older payloads carry
/// objects with a `gameId` field, and anything else is kept verbatim so the
/// diagnostic can show it.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchReference {
    Canonical(String),
    Structured { game_id: Option<String>, raw: String },
    Unrecognized(String),
}

impl MatchReference {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(id) if !id.trim().is_empty() => Self::Canonical(id.clone()),
            Value::Object(map) => Self::Structured {
                game_id: map.get("gameId").and_then(game_id_text),
                raw: value.to_string(),
            },
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Resolves to the id used to fetch the match payload.
    pub fn resolve(&self) -> Result<String, ResolveError> {
        match self {
            Self::Canonical(id) => Ok(id.clone()),
            Self::Structured {
                game_id: Some(id), ..
            } => Ok(id.clone()),
            Self::Structured { game_id: None, raw } => Err(ResolveError::MissingGameId(raw.clone())),
            Self::Unrecognized(raw) => Err(ResolveError::Unrecognized(raw.clone())),
        }
    }
}

impl From<&Value> for MatchReference {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

impl From<&str> for MatchReference {
    fn from(id: &str) -> Self {
        Self::from_value(&Value::String(id.to_string()))
    }
}

// Legacy ids are numbers; some mirrors re-encode them as strings.
fn game_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
