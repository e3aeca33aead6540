use std::time::Duration;

use models::{
    BattleLog, CardList, Clan, CurrentWar, Leaderboard, Player, Season, Tag, TournamentList,
    WarLog,
};
use reqwest::{header::ACCEPT, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub mod models;

pub const DEFAULT_BASE_URL: &str = "https://api.clashroyale.com/v1/";

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(#[from] ApiError);

impl Error {
    /// True when the upstream answered and refused the request (bad tag,
    /// bad key, rate limit), as opposed to a transport or decoding failure.
    pub fn is_upstream_rejection(&self) -> bool {
        matches!(
            self.0,
            ApiError::NotFound
                | ApiError::Forbidden
                | ApiError::RateLimited
                | ApiError::Status { .. }
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match &self.0 {
            ApiError::NotFound => Some(StatusCode::NOT_FOUND),
            ApiError::Forbidden => Some(StatusCode::FORBIDDEN),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
enum ApiError {
    #[error("Invalid upstream base URL {0}")]
    BaseUrl(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to the upstream API timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("Failed to connect to the upstream API: {0}")]
    Reqwest(#[source] reqwest::Error),
    #[error("Failed to decode {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("Resource not found. Check the player tag or clan tag.")]
    NotFound,
    #[error("Access forbidden. Check your API key.")]
    Forbidden,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("API request failed with status {status}: {error}")]
    Status {
        status: StatusCode,
        error: serde_json::Value,
    },
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e)
    } else {
        ApiError::Reqwest(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct Api {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl Api {
    #[instrument(skip(api_key))]
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::BaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()).into());
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: parsed,
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(url = %url, "Getting {endpoint}");
        let res = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let status = res.status();
        if status.is_success() {
            let body = res
                .json::<T>()
                .await
                .map_err(|source| ApiError::Decode { endpoint, source })?;
            info!("Got {endpoint}");
            Ok(body)
        } else {
            let error = res
                .json::<serde_json::Value>()
                .await
                .unwrap_or("No error details".into());
            tracing::error!(
                status = ?status,
                error = ?error,
                "Failed to get {endpoint}"
            );
            Err(match status {
                StatusCode::NOT_FOUND => ApiError::NotFound,
                StatusCode::FORBIDDEN => ApiError::Forbidden,
                StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
                status => ApiError::Status { status, error },
            }
            .into())
        }
    }

    #[instrument(skip(self))]
    pub async fn get_player(&self, tag: &Tag) -> Result<Player> {
        let url = self.url(&["players", &tag.hashed()])?;
        self.get("player", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_battle_log(&self, tag: &Tag) -> Result<BattleLog> {
        let url = self.url(&["players", &tag.hashed(), "battlelog"])?;
        self.get("battle log", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_clan(&self, tag: &Tag) -> Result<Clan> {
        let url = self.url(&["clans", &tag.hashed()])?;
        self.get("clan", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_clan_war_log(&self, tag: &Tag) -> Result<WarLog> {
        let url = self.url(&["clans", &tag.hashed(), "warlog"])?;
        self.get("war log", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_clan_current_war(&self, tag: &Tag) -> Result<CurrentWar> {
        let url = self.url(&["clans", &tag.hashed(), "currentwar"])?;
        self.get("current war", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_cards(&self) -> Result<CardList> {
        let url = self.url(&["cards"])?;
        self.get("cards", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn get_path_of_legends(&self, season: Season) -> Result<Leaderboard> {
        let url = match season {
            Season::Current => self.url(&["locations", "global", "pathoflegend", "players"])?,
            Season::Month(_) => self.url(&[
                "locations",
                "global",
                "pathoflegend",
                &season.to_string(),
                "rankings",
                "players",
            ])?,
        };
        self.get("path of legends leaderboard", url, &[]).await
    }

    #[instrument(skip(self))]
    pub async fn search_tournaments(&self, name: &str) -> Result<TournamentList> {
        let url = self.url(&["tournaments"])?;
        self.get("tournaments", url, &[("name", name)]).await
    }
}
