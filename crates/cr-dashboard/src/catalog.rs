use cr_api::models::{Card, CardList};
use tracing::info;

use crate::{
    gateway::{self, Gateway},
    level::Rarity,
    stats::sort_by_elixir,
    view::{Listing, Remote},
};

pub const NO_MATCHES: &str = "No cards match the current filters.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub rarity: Option<Rarity>,
    pub name: Option<String>,
}

impl CardFilter {
    fn matches(&self, card: &Card) -> bool {
        let rarity_ok = self.rarity.map_or(true, |wanted| {
            card.rarity.as_deref().and_then(Rarity::parse) == Some(wanted)
        });
        let name_ok = self.name.as_deref().map(str::trim).map_or(true, |needle| {
            card.name.to_lowercase().contains(&needle.to_lowercase())
        });
        rarity_ok && name_ok
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    cards: Remote<Vec<Card>>,
    banner: Option<String>,
}

impl Catalog {
    pub fn cards(&self) -> &Remote<Vec<Card>> {
        &self.cards
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn mount(&mut self) -> bool {
        if matches!(self.cards, Remote::Absent) {
            self.cards = Remote::Loading;
            true
        } else {
            false
        }
    }

    pub fn complete(&mut self, result: gateway::Result<CardList>) {
        match result {
            Ok(list) => {
                let mut cards = list.items;
                sort_by_elixir(&mut cards);
                info!(count = cards.len(), "Card catalog loaded");
                self.cards = Remote::Ready(cards);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load cards");
                self.cards = Remote::Absent;
                self.banner = Some(e.banner());
            }
        }
    }

    pub async fn load<G: Gateway>(&mut self, gateway: &G) {
        if self.mount() {
            let result = gateway.cards().await;
            self.complete(result);
        }
    }

    pub fn filtered(&self, filter: &CardFilter) -> Option<Listing<&Card>> {
        let cards = self.cards.ready()?;
        let rows = cards.iter().filter(|c| filter.matches(c)).collect();
        Some(Listing::from_rows(rows, NO_MATCHES))
    }
}
