use thiserror::Error;

/// Why a match reference could not be turned into a match id.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("match reference has no gameId: {0}")]
    MissingGameId(String),
    #[error("invalid match reference structure: {0}")]
    Unrecognized(String),
}

/// Why a single match produced no row. Never aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error(transparent)]
    UnresolvableReference(#[from] ResolveError),
    #[error("no participant matches puuid {puuid}")]
    ParticipantNotFound { puuid: String },
    #[error("malformed match payload: {0}")]
    MalformedPayload(String),
    #[error("failed to derive {field}: {detail}")]
    FieldDerivation { field: &'static str, detail: String },
    #[error("source failure: {0}")]
    Source(String),
}

/// A column ended up longer than the table's row count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("column '{column}' has {len} values but the table has {rows} rows")]
pub struct TableShapeError {
    pub column: &'static str,
    pub len: usize,
    pub rows: usize,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RIOT_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid API key header value: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Riot API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("too many requests for URL {0}")]
    TooManyRequests(String),
    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}
