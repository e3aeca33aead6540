use axum::extract::{Path, Query, State};
use cr_api::{
    models::{Leaderboard, Season, TournamentList},
    Api,
};
use serde::Deserialize;
use tracing::instrument;

use super::envelope::{Envelope, ProxyError, ProxyResult};

#[instrument(skip(api))]
pub(crate) async fn path_of_legends(
    Path(season): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<Leaderboard> {
    let season: Season = season.parse()?;
    let board = api
        .get_path_of_legends(season)
        .await
        .map_err(|e| ProxyError::upstream(e, "leaderboard"))?;
    Ok(Envelope::ok(board))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TournamentQuery {
    name: Option<String>,
}

#[instrument(skip(api))]
pub(crate) async fn search_tournaments(
    Query(query): Query<TournamentQuery>,
    State(api): State<Api>,
) -> ProxyResult<TournamentList> {
    let name = query.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ProxyError::bad_request(
            "Tournament name is required. Use ?name=<tournament_name>",
        ));
    }
    let found = api
        .search_tournaments(name)
        .await
        .map_err(|e| ProxyError::upstream(e, "tournaments"))?;
    Ok(Envelope::ok(found))
}
