use std::collections::{HashMap, HashSet};

use cr_api::models::{Card, Leaderboard, ParseError, Season, Tag};
use tracing::{debug, info, instrument};

use crate::{
    gateway::{self, Gateway},
    level::proportional_card_level,
    view::{Listing, Remote},
};

pub const NO_PLAYERS: &str = "No players found for this season.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRow {
    pub rank: u32,
    pub tag: Tag,
    pub name: String,
    pub rating: Option<u32>,
    pub clan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCard {
    pub name: String,
    pub level: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRequest {
    pub season: Season,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckRequest {
    pub tag: Tag,
}

/// Decks fetched for expanded rows are kept for the whole session and are
/// never refetched, even across season changes.
#[derive(Debug)]
pub struct LeaderboardView {
    season: Season,
    generation: u64,
    board: Remote<Leaderboard>,
    expanded: Option<Tag>,
    decks: HashMap<Tag, Vec<Card>>,
    pending: HashSet<Tag>,
    banner: Option<String>,
}

impl Default for LeaderboardView {
    fn default() -> Self {
        Self {
            season: Season::Current,
            generation: 0,
            board: Remote::Absent,
            expanded: None,
            decks: HashMap::new(),
            pending: HashSet::new(),
            banner: None,
        }
    }
}

impl LeaderboardView {
    pub fn season(&self) -> Season {
        self.season
    }

    pub fn board(&self) -> &Remote<Leaderboard> {
        &self.board
    }

    pub fn expanded(&self) -> Option<&Tag> {
        self.expanded.as_ref()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn choose_season(&mut self, input: &str) -> Result<BoardRequest, ParseError> {
        let season = input.parse::<Season>().map_err(|e| {
            self.banner = Some(e.to_string());
            e
        })?;
        Ok(self.select_season(season))
    }

    pub fn select_season(&mut self, season: Season) -> BoardRequest {
        self.generation += 1;
        self.season = season;
        self.board = Remote::Loading;
        self.expanded = None;
        self.banner = None;
        BoardRequest {
            season,
            generation: self.generation,
        }
    }

    pub fn complete_board(
        &mut self,
        request: &BoardRequest,
        result: gateway::Result<Leaderboard>,
    ) -> bool {
        if request.generation != self.generation {
            debug!(season = %request.season, "Dropping stale leaderboard");
            return false;
        }
        match result {
            Ok(board) => self.board = Remote::Ready(board),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load leaderboard");
                self.board = Remote::Absent;
                self.banner = Some(e.banner());
            }
        }
        true
    }

    pub fn rows(&self) -> Option<Listing<RankRow>> {
        let board = self.board.ready()?;
        let rows = board
            .items
            .iter()
            .map(|p| RankRow {
                rank: p.rank,
                tag: p.tag.clone(),
                name: p.name.clone(),
                rating: p.elo_rating.or(p.trophies),
                clan: p.clan.as_ref().map(|c| c.name.clone()),
            })
            .collect();
        Some(Listing::from_rows(rows, NO_PLAYERS))
    }

    pub fn toggle(&mut self, tag: Tag) -> Option<DeckRequest> {
        if self.expanded.as_ref() == Some(&tag) {
            self.expanded = None;
            return None;
        }
        self.expanded = Some(tag.clone());
        if self.decks.contains_key(&tag) || !self.pending.insert(tag.clone()) {
            debug!(%tag, "Deck already held or in flight");
            return None;
        }
        Some(DeckRequest { tag })
    }

    /// Deck responses are keyed by tag, so a late one is still kept.
    pub fn complete_deck(&mut self, request: DeckRequest, result: gateway::Result<Vec<Card>>) {
        self.pending.remove(&request.tag);
        match result {
            Ok(deck) => {
                self.decks.entry(request.tag).or_insert(deck);
            }
            Err(e) => {
                tracing::error!(error = %e, tag = %request.tag, "Failed to load deck");
                if self.expanded.as_ref() == Some(&request.tag) {
                    self.banner = Some(e.banner());
                }
            }
        }
    }

    pub fn is_deck_loading(&self, tag: &Tag) -> bool {
        self.pending.contains(tag)
    }

    pub fn preview(&self, tag: &Tag) -> Option<Vec<PreviewCard>> {
        let deck = self.decks.get(tag)?;
        Some(
            deck.iter()
                .map(|card| PreviewCard {
                    name: card.name.clone(),
                    level: proportional_card_level(card),
                })
                .collect(),
        )
    }

    #[instrument(skip(self, gateway))]
    pub async fn load<G: Gateway>(&mut self, gateway: &G, season: Season) {
        let request = self.select_season(season);
        let result = gateway.leaderboard(season).await;
        self.complete_board(&request, result);
    }

    #[instrument(skip(self, gateway))]
    pub async fn expand<G: Gateway>(&mut self, gateway: &G, tag: Tag) {
        if let Some(request) = self.toggle(tag) {
            info!(tag = %request.tag, "Fetching deck preview");
            let result = gateway.current_deck(&request.tag).await;
            self.complete_deck(request, result);
        }
    }
}
