use std::future::Future;

use cr_api::models::{BattleLog, Card, CardList, Clan, Leaderboard, ParseError, Player, Season, Tag};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:5050";

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(#[from] ParseError),
    #[error("Invalid proxy URL {0}")]
    ProxyUrl(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Failed to reach the proxy: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Failed to decode proxy response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    pub fn banner(&self) -> String {
        match self {
            Error::InvalidInput(e) => e.to_string(),
            Error::Upstream(message) => message.clone(),
            Error::ProxyUrl(_) | Error::Network(_) => {
                "Could not reach the server. Is the proxy running?".to_string()
            }
            Error::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait Gateway: Send + Sync {
    fn player(&self, tag: &Tag) -> impl Future<Output = Result<Player>> + Send;

    fn current_deck(&self, tag: &Tag) -> impl Future<Output = Result<Vec<Card>>> + Send;

    fn battle_log(&self, tag: &Tag) -> impl Future<Output = Result<BattleLog>> + Send;

    fn clan(&self, tag: &Tag) -> impl Future<Output = Result<Clan>> + Send;

    fn cards(&self) -> impl Future<Output = Result<CardList>> + Send;

    fn leaderboard(&self, season: Season) -> impl Future<Output = Result<Leaderboard>> + Send;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|_| Error::ProxyUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::ProxyUrl(base_url.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: parsed,
        })
    }

    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "Fetching");
        let res = self.client.get(url).send().await.map_err(Error::Network)?;
        let status = res.status();
        let body = res.bytes().await.map_err(Error::Network)?;

        let envelope = match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(Error::Decode(e)),
            Err(_) => {
                warn!(status = ?status, "Proxy returned a non-JSON failure");
                return Err(Error::Upstream(GENERIC_FAILURE.to_string()));
            }
        };
        match envelope {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } if status.is_success() => Ok(data),
            Envelope { error, .. } => {
                warn!(status = ?status, error = ?error, "Proxy reported a failure");
                Err(Error::Upstream(
                    error.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                ))
            }
        }
    }
}

impl Gateway for HttpGateway {
    #[instrument(skip(self))]
    async fn player(&self, tag: &Tag) -> Result<Player> {
        self.get(self.url(&["api", "players", tag.as_str()])).await
    }

    #[instrument(skip(self))]
    async fn current_deck(&self, tag: &Tag) -> Result<Vec<Card>> {
        self.get(self.url(&["api", "players", tag.as_str(), "currentdeck"]))
            .await
    }

    #[instrument(skip(self))]
    async fn battle_log(&self, tag: &Tag) -> Result<BattleLog> {
        self.get(self.url(&["api", "players", tag.as_str(), "battlelog"]))
            .await
    }

    #[instrument(skip(self))]
    async fn clan(&self, tag: &Tag) -> Result<Clan> {
        self.get(self.url(&["api", "clans", tag.as_str()])).await
    }

    #[instrument(skip(self))]
    async fn cards(&self) -> Result<CardList> {
        self.get(self.url(&["api", "cards", ""])).await
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, season: Season) -> Result<Leaderboard> {
        let season = season.to_string();
        self.get(self.url(&["api", "leaderboards", "pathoflegends", &season]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn tag_forms_share_a_path() {
        let gateway = HttpGateway::new(DEFAULT_PROXY_URL).unwrap();
        let hashed = Tag::parse("#2pp").unwrap();
        let bare = Tag::parse("2PP").unwrap();
        let a = gateway.url(&["api", "players", hashed.as_str()]);
        let b = gateway.url(&["api", "players", bare.as_str()]);
        assert_eq!(a, b);
        assert_eq!(a.path(), "/api/players/2PP");
    }

    #[test]
    fn cards_path_keeps_trailing_slash() {
        let gateway = HttpGateway::new("http://localhost:5050/").unwrap();
        assert_eq!(gateway.url(&["api", "cards", ""]).path(), "/api/cards/");
    }

    #[test]
    fn banners_stay_user_facing() {
        assert_eq!(
            Error::InvalidInput(ParseError::EmptyTag).banner(),
            "Please enter a tag"
        );
        assert_eq!(Error::Upstream("Rate limit".into()).banner(), "Rate limit");
        assert!(HttpGateway::new("nope").is_err());
    }

    async fn proxy_player(Path(tag): Path<String>) -> (StatusCode, Json<Value>) {
        match tag.as_str() {
            "2PP" => (
                StatusCode::OK,
                Json(json!({"success": true, "data": {
                    "tag": "#2PP", "name": "Tester", "expLevel": 1,
                    "trophies": 1, "bestTrophies": 1
                }})),
            ),
            "GONE" => (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": "Resource not found."})),
            ),
            "QUIET" => (StatusCode::BAD_REQUEST, Json(json!({"success": false}))),
            _ => (StatusCode::OK, Json(json!({"success": true, "data": "not a player"}))),
        }
    }

    async fn stub_proxy() -> SocketAddr {
        let app = Router::new()
            .route("/api/players/:tag", get(proxy_player))
            .route(
                "/api/clans/:tag",
                get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    #[tokio::test]
    async fn decodes_envelopes_and_surfaces_errors() {
        let addr = stub_proxy().await;
        let gateway = HttpGateway::new(&format!("http://{addr}")).unwrap();

        let player = gateway.player(&Tag::parse("#2pp").unwrap()).await.unwrap();
        assert_eq!(player.name, "Tester");

        let err = gateway.player(&Tag::parse("gone").unwrap()).await.unwrap_err();
        assert_eq!(err.banner(), "Resource not found.");

        let err = gateway.player(&Tag::parse("quiet").unwrap()).await.unwrap_err();
        assert_eq!(err.banner(), GENERIC_FAILURE);

        let err = gateway.player(&Tag::parse("odd").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = gateway.clan(&Tag::parse("c").unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let gateway = HttpGateway::new(&format!("http://{addr}")).unwrap();
        let err = gateway.cards().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
