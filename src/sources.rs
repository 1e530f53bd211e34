use crate::aggregate::PlayerIdentity;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists a player's most recent matches, newest first.
pub trait MatchHistorySource {
    fn match_references(&self, identity: &PlayerIdentity, count: usize) -> Result<Vec<Value>>;
}

/// Fetches the full match document for a resolved match id.
pub trait MatchPayloadSource {
    fn match_payload(&self, match_id: &str) -> Result<Value>;
}

pub trait PlayerIdentitySource {
    fn resolve_player(&self, game_name: &str, tag_line: &str) -> Result<PlayerIdentity>;
}

/// A directory of `<match_id>.json` files written by `download`.
#[derive(Debug, Clone)]
pub struct LocalMatchStore {
    dir: PathBuf,
}

impl LocalMatchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, match_id: &str, match_json: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let serialized = serde_json::to_vec_pretty(match_json)?;
        let file_path = self.path_for(match_id)?;
        fs::write(&file_path, serialized)
            .with_context(|| format!("writing {}", file_path.display()))?;
        Ok(file_path)
    }

    /// Saved match ids, highest first. Match ids of one platform grow over
    /// time, so this approximates newest first.
    pub fn saved_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("reading {}", self.dir.display()))?;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry in {}: {}", self.dir.display(), err);
                    continue;
                }
            };

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort_by(|a, b| compare_match_ids(b, a));
        Ok(ids)
    }

    /// Ids become file names, so anything that could leave `dir` is refused.
    fn path_for(&self, match_id: &str) -> Result<PathBuf> {
        if match_id.is_empty()
            || match_id.contains(['/', '\\'])
            || match_id.contains("..")
        {
            bail!("refusing match id '{}' as a file name", match_id);
        }
        Ok(self.dir.join(format!("{}.json", match_id)))
    }
}

// "NA1_900" < "NA1_1000": compare the numeric suffix when both have one.
fn compare_match_ids(a: &str, b: &str) -> std::cmp::Ordering {
    let split = |id: &str| -> Option<(String, u64)> {
        let (platform, number) = id.rsplit_once('_')?;
        Some((platform.to_string(), number.parse().ok()?))
    };
    match (split(a), split(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => a.cmp(b),
    }
}

impl MatchHistorySource for LocalMatchStore {
    fn match_references(&self, _identity: &PlayerIdentity, count: usize) -> Result<Vec<Value>> {
        Ok(self
            .saved_ids()?
            .into_iter()
            .take(count)
            .map(Value::String)
            .collect())
    }
}

impl MatchPayloadSource for LocalMatchStore {
    fn match_payload(&self, match_id: &str) -> Result<Value> {
        let path = self.path_for(match_id)?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let parsed = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn saved_matches_round_trip_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMatchStore::new(dir.path().join("matches"));
        let doc = json!({"info": {"gameDuration": 60}});

        store.save("NA1_900", &doc).unwrap();
        store.save("NA1_1000", &doc).unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.saved_ids().unwrap(), vec!["NA1_1000", "NA1_900"]);
        assert_eq!(store.match_payload("NA1_900").unwrap(), doc);

        let identity = PlayerIdentity::from_puuid("p");
        let refs = store.match_references(&identity, 1).unwrap();
        assert_eq!(refs, vec![json!("NA1_1000")]);
    }

    #[test]
    fn ids_that_escape_the_directory_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMatchStore::new(dir.path().join("matches"));
        fs::write(dir.path().join("secret.json"), "{}").unwrap();

        for id in ["../secret", "..", "a/b", "a\\b", ""] {
            let err = store.match_payload(id).unwrap_err();
            assert!(err.to_string().contains("refusing"), "{}", id);
            assert!(store.save(id, &json!({})).is_err(), "{}", id);
        }
        assert!(!dir.path().join("matches").join("b.json").exists());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMatchStore::new(dir.path());
        let err = store.match_payload("NA1_1").unwrap_err();
        assert!(format!("{:#}", err).contains("NA1_1.json"));
    }
}
