use crate::error::{ClientError, ConfigError};
use crate::riot_api::MAX_MATCHES_PER_REQUEST;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MATCH_COUNT: usize = 5;
/// Ranked solo/duo.
pub const DEFAULT_QUEUE: u16 = 420;

/// A League platform (shard). Account and match data live on the regional
/// route the platform belongs to; summoner data lives on the platform host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Na1,
    Br1,
    La1,
    La2,
    Euw1,
    Eun1,
    Tr1,
    Ru,
    Me1,
    Kr,
    Jp1,
    Oc1,
    Ph2,
    Sg2,
    Th2,
    Tw2,
    Vn2,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Na1 => "NA1",
            Platform::Br1 => "BR1",
            Platform::La1 => "LA1",
            Platform::La2 => "LA2",
            Platform::Euw1 => "EUW1",
            Platform::Eun1 => "EUN1",
            Platform::Tr1 => "TR1",
            Platform::Ru => "RU",
            Platform::Me1 => "ME1",
            Platform::Kr => "KR",
            Platform::Jp1 => "JP1",
            Platform::Oc1 => "OC1",
            Platform::Ph2 => "PH2",
            Platform::Sg2 => "SG2",
            Platform::Th2 => "TH2",
            Platform::Tw2 => "TW2",
            Platform::Vn2 => "VN2",
        }
    }

    /// Regional route for match-v5.
    pub fn routing(self) -> &'static str {
        match self {
            Platform::Na1 | Platform::Br1 | Platform::La1 | Platform::La2 => "americas",
            Platform::Euw1 | Platform::Eun1 | Platform::Tr1 | Platform::Ru | Platform::Me1 => {
                "europe"
            }
            Platform::Kr | Platform::Jp1 => "asia",
            Platform::Oc1
            | Platform::Ph2
            | Platform::Sg2
            | Platform::Th2
            | Platform::Tw2
            | Platform::Vn2 => "sea",
        }
    }

    /// Regional route for account-v1, which has no `sea` cluster.
    pub fn account_routing(self) -> &'static str {
        match self.routing() {
            "sea" => "asia",
            other => other,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let platform = match s.trim().to_uppercase().as_str() {
            "NA1" | "NA" => Platform::Na1,
            "BR1" | "BR" => Platform::Br1,
            "LA1" | "LAN" => Platform::La1,
            "LA2" | "LAS" => Platform::La2,
            "EUW1" | "EUW" => Platform::Euw1,
            "EUN1" | "EUNE" => Platform::Eun1,
            "TR1" | "TR" => Platform::Tr1,
            "RU" => Platform::Ru,
            "ME1" => Platform::Me1,
            "KR" => Platform::Kr,
            "JP1" | "JP" => Platform::Jp1,
            "OC1" | "OCE" => Platform::Oc1,
            "PH2" => Platform::Ph2,
            "SG2" => Platform::Sg2,
            "TH2" => Platform::Th2,
            "TW2" => Platform::Tw2,
            "VN2" => Platform::Vn2,
            _ => return Err(ConfigError::UnknownPlatform(s.to_string())),
        };
        Ok(platform)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub platform: Platform,
    pub match_count: usize,
    /// `None` lists every queue.
    pub queue: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            platform: Platform::Na1,
            match_count: DEFAULT_MATCH_COUNT,
            queue: Some(DEFAULT_QUEUE),
        }
    }
}

impl Config {
    /// Reads `RIOT_API_KEY`, `RIOT_PLATFORM`, `RIOT_MATCH_COUNT` and
    /// `RIOT_QUEUE`, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.api_key = value("RIOT_API_KEY").map(|v| v.trim().to_string());

        if let Some(raw) = value("RIOT_PLATFORM") {
            config.platform = raw.parse()?;
        }

        if let Some(raw) = value("RIOT_MATCH_COUNT") {
            let count: usize = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "RIOT_MATCH_COUNT",
                value: raw.clone(),
            })?;
            config.set_match_count(count);
        }

        match lookup("RIOT_QUEUE") {
            Some(raw) if raw.trim().is_empty() || raw.trim() == "0" => config.queue = None,
            Some(raw) => {
                config.queue = Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "RIOT_QUEUE",
                    value: raw.clone(),
                })?)
            }
            None => {}
        }

        Ok(config)
    }

    /// Keeps the count inside what one history request can return.
    pub fn set_match_count(&mut self, count: usize) {
        self.match_count = count.clamp(1, MAX_MATCHES_PER_REQUEST);
    }

    pub fn api_key(&self) -> Result<&str, ClientError> {
        self.api_key.as_deref().ok_or(ClientError::MissingApiKey)
    }
}
