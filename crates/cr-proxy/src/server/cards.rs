use axum::extract::{Path, State};
use cr_api::{
    models::{Card, CardList},
    Api,
};
use serde::Serialize;
use tracing::instrument;

use super::envelope::{Envelope, ProxyError, ProxyResult};

async fn catalog(api: &Api) -> Result<CardList, ProxyError> {
    api.get_cards()
        .await
        .map_err(|e| ProxyError::upstream(e, "cards"))
}

#[instrument(skip(api))]
pub(crate) async fn all_cards(State(api): State<Api>) -> ProxyResult<CardList> {
    Ok(Envelope::ok(catalog(&api).await?))
}

#[derive(Debug, Serialize)]
pub(crate) struct RarityCards {
    pub items: Vec<Card>,
    pub count: usize,
}

#[instrument(skip(api))]
pub(crate) async fn cards_by_rarity(
    Path(rarity): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<RarityCards> {
    let items = catalog(&api).await?.by_rarity(&rarity);
    Ok(Envelope::ok(RarityCards {
        count: items.len(),
        items,
    }))
}

#[instrument(skip(api))]
pub(crate) async fn card(Path(name): Path<String>, State(api): State<Api>) -> ProxyResult<Card> {
    let cards = catalog(&api).await?;
    match cards.find(&name) {
        Some(card) => Ok(Envelope::ok(card.clone())),
        None => Err(ProxyError::not_found(format!("Card not found: {name}"))),
    }
}
