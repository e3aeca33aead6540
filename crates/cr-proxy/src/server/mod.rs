use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{FromRef, State},
    http::{header, HeaderValue, Method, Request, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, Span};

use crate::settings::Settings;

mod cards;
mod clans;
mod competitive;
mod envelope;
mod players;

use envelope::ProxyError;

#[derive(Debug, Clone)]
struct AppData {
    api: cr_api::Api,
    started_at: DateTime<Utc>,
}

impl FromRef<AppData> for cr_api::Api {
    fn from_ref(state: &AppData) -> Self {
        state.api.clone()
    }
}

pub(crate) struct Server {
    app: Router<()>,
    listen_addr: SocketAddr,
}

impl Server {
    pub fn new(api: cr_api::Api, settings: &Settings) -> Result<Self> {
        let cors = cors_layer(&settings.cors_origins)?;
        Ok(Self {
            app: router(api, cors),
            listen_addr: settings.listen_addr,
        })
    }

    #[instrument(skip_all)]
    pub async fn start(self, token: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.listen_addr))?;
        info!(addr = %listener.local_addr()?, "Listening");
        notify_ready();

        axum::serve(listener, self.app)
            .with_graceful_shutdown(token.cancelled_owned())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

fn router(api: cr_api::Api, cors: CorsLayer) -> Router<()> {
    let app_data = AppData {
        api,
        started_at: Utc::now(),
    };

    Router::new()
        .route("/", get(health))
        .route("/api", get(index))
        .route("/api/players/:tag", get(players::player))
        .route("/api/players/:tag/battlelog", get(players::battle_log))
        .route("/api/players/:tag/currentdeck", get(players::current_deck))
        .route("/api/players/:tag/stats", get(players::stats))
        .route("/api/clans/:tag", get(clans::clan))
        .route("/api/clans/:tag/members", get(clans::members))
        .route("/api/clans/:tag/warlog", get(clans::war_log))
        .route("/api/clans/:tag/currentwar", get(clans::current_war))
        .route("/api/cards", get(cards::all_cards))
        .route("/api/cards/", get(cards::all_cards))
        .route("/api/cards/rarity/:rarity", get(cards::cards_by_rarity))
        .route("/api/cards/:name", get(cards::card))
        .route(
            "/api/leaderboards/pathoflegends/:season",
            get(competitive::path_of_legends),
        )
        .route("/api/tournaments/search", get(competitive::search_tournaments))
        .fallback(not_found)
        .with_state(app_data)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|_request: &Request<Body>| tracing::info_span!("http-request"))
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!(method = %request.method(), path = %request.uri().path(), "got request")
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    tracing::info!(status = %response.status(), "response generated in {:?}", latency)
                }),
        )
        .layer(cors)
}

/// Only the configured origins may read responses. An empty list opens the
/// proxy to every origin.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin {o:?}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

async fn health(State(state): State<AppData>) -> Json<Value> {
    Json(json!({
        "message": "Clash Royale Tracking App API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at.to_rfc3339(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "endpoints": {
            "players": {
                "player": "/api/players/{tag}",
                "battlelog": "/api/players/{tag}/battlelog",
                "currentdeck": "/api/players/{tag}/currentdeck",
                "stats": "/api/players/{tag}/stats"
            },
            "clans": {
                "clan": "/api/clans/{tag}",
                "members": "/api/clans/{tag}/members?sort_by=trophies|donations|role&order=desc|asc",
                "warlog": "/api/clans/{tag}/warlog",
                "currentwar": "/api/clans/{tag}/currentwar"
            },
            "cards": {
                "all": "/api/cards/",
                "rarity": "/api/cards/rarity/{rarity}",
                "card": "/api/cards/{name}"
            },
            "leaderboards": {
                "pathoflegends": "/api/leaderboards/pathoflegends/{current|YYYY-MM}"
            },
            "tournaments": {
                "search": "/api/tournaments/search?name={name}"
            }
        }
    }))
}

async fn not_found() -> ProxyError {
    ProxyError::not_found("Endpoint not found. Check /api for available endpoints.")
}

#[cfg(target_os = "linux")]
fn notify_ready() {
    use libsystemd::daemon::{self, NotifyState};

    if !daemon::booted() {
        return;
    }
    match daemon::notify(false, &[NotifyState::Ready]) {
        Ok(true) => info!("Notified systemd of readiness"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = ?e, "Failed to notify systemd"),
    }
}

#[cfg(not(target_os = "linux"))]
fn notify_ready() {}
