use crate::aggregate::PlayerIdentity;
use crate::config::Platform;
use crate::error::ClientError;
use crate::sources::{MatchHistorySource, MatchPayloadSource, PlayerIdentitySource};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::thread::sleep;
use std::time::Duration;

pub const MAX_MATCHES_PER_REQUEST: usize = 100;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SummonerResponse {
    pub id: Option<String>,
}

fn build_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert("X-Riot-Token", HeaderValue::from_str(api_key)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Handle on the Riot REST API for one platform. The key is given at
/// construction; nothing is read from the environment here.
pub struct RiotClient {
    client: Client,
    headers: HeaderMap,
    platform: Platform,
    queue: Option<u16>,
}

impl RiotClient {
    pub fn new(api_key: &str, platform: Platform, queue: Option<u16>) -> Result<Self, ClientError> {
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            headers: build_headers(api_key)?,
            platform,
            queue,
        })
    }

    fn regional_url(&self) -> String {
        format!("https://{}.api.riotgames.com", self.platform.routing())
    }

    fn account_url(&self) -> String {
        format!("https://{}.api.riotgames.com", self.platform.account_routing())
    }

    fn platform_url(&self) -> String {
        format!(
            "https://{}.api.riotgames.com",
            self.platform.as_str().to_lowercase()
        )
    }

    pub fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountResponse, ClientError> {
        let url = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            self.account_url(),
            game_name,
            tag_line
        );

        self.get_json(&url)
    }

    pub fn get_summoner_by_puuid(&self, puuid: &str) -> Result<SummonerResponse, ClientError> {
        let url = format!(
            "{}/lol/summoner/v4/summoners/by-puuid/{}",
            self.platform_url(),
            puuid
        );

        self.get_json(&url)
    }

    /// Raw history entries; match-v5 answers with id strings.
    pub fn get_match_history(&self, puuid: &str, count: usize) -> Result<Vec<Value>, ClientError> {
        let count = count.clamp(1, MAX_MATCHES_PER_REQUEST);
        let mut url = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start=0&count={}",
            self.regional_url(),
            puuid,
            count
        );
        if let Some(queue) = self.queue {
            url.push_str(&format!("&queue={}", queue));
        }

        self.get_json(&url)
    }

    pub fn get_match_json(&self, match_id: &str) -> Result<Value, ClientError> {
        let url = format!("{}/lol/match/v5/matches/{}", self.regional_url(), match_id);

        self.get_json(&url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.request_with_retry(url)?;
        Ok(response.json()?)
    }

    fn request_with_retry(&self, url: &str) -> Result<reqwest::blocking::Response, ClientError> {
        const MAX_ATTEMPTS: usize = 2;
        let mut attempt = 0;

        loop {
            attempt += 1;

            log::debug!("GET {} (attempt {})", url, attempt);
            let response = self.client.get(url).headers(self.headers.clone()).send()?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= MAX_ATTEMPTS {
                    return Err(ClientError::TooManyRequests(url.to_string()));
                }

                let wait = parse_retry_after(&response).unwrap_or(Duration::from_secs(10));
                log::warn!("Rate limited, retrying in {}s", wait.as_secs());
                sleep(wait);
                continue;
            }

            if !response.status().is_success() {
                return Err(ClientError::Status {
                    url: url.to_string(),
                    status: response.status(),
                });
            }

            return Ok(response);
        }
    }
}

fn parse_retry_after(response: &reqwest::blocking::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

impl PlayerIdentitySource for RiotClient {
    fn resolve_player(&self, game_name: &str, tag_line: &str) -> anyhow::Result<PlayerIdentity> {
        let account = self.get_account_by_riot_id(game_name, tag_line)?;
        log::info!(
            "Resolved {}#{} to {}",
            account.game_name.as_deref().unwrap_or(game_name),
            account.tag_line.as_deref().unwrap_or(tag_line),
            account.puuid
        );

        let summoner_id = match self.get_summoner_by_puuid(&account.puuid) {
            Ok(summoner) => summoner.id,
            Err(err) => {
                log::warn!("Summoner lookup failed for {}: {}", account.puuid, err);
                None
            }
        };

        Ok(PlayerIdentity {
            puuid: account.puuid,
            summoner_id,
        })
    }
}

impl MatchHistorySource for RiotClient {
    fn match_references(&self, identity: &PlayerIdentity, count: usize) -> anyhow::Result<Vec<Value>> {
        Ok(self.get_match_history(&identity.puuid, count)?)
    }
}

impl MatchPayloadSource for RiotClient {
    fn match_payload(&self, match_id: &str) -> anyhow::Result<Value> {
        Ok(self.get_match_json(match_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            RiotClient::new("  ", Platform::Na1, None),
            Err(ClientError::MissingApiKey)
        ));
    }

    #[test]
    fn hosts_follow_platform_routing() {
        let client = RiotClient::new("RGAPI-test", Platform::Euw1, Some(420)).unwrap();
        assert_eq!(client.regional_url(), "https://europe.api.riotgames.com");
        assert_eq!(client.platform_url(), "https://euw1.api.riotgames.com");

        let client = RiotClient::new("RGAPI-test", Platform::Oc1, None).unwrap();
        assert_eq!(client.regional_url(), "https://sea.api.riotgames.com");
        assert_eq!(client.account_url(), "https://asia.api.riotgames.com");
    }
}
