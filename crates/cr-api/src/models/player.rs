use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::{Arena, Card, Tag};

pub fn win_rate(wins: u32, losses: u32) -> Option<f64> {
    let decided = u64::from(wins) + u64::from(losses);
    if decided == 0 {
        return None;
    }
    Some(f64::from(wins) * 100.0 / decided as f64)
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClanRef {
    pub tag: Tag,
    pub name: String,
    pub badge_id: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeIcons {
    pub large: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub name: String,
    pub level: Option<u32>,
    pub max_level: Option<u32>,
    pub progress: Option<u32>,
    pub target: Option<u32>,
    pub icon_urls: Option<BadgeIcons>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub tag: Tag,
    pub name: String,
    pub exp_level: u32,
    pub trophies: u32,
    pub best_trophies: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub battle_count: u32,
    #[serde(default)]
    pub three_crown_wins: u32,
    pub role: Option<String>,
    pub donations: Option<u32>,
    pub donations_received: Option<u32>,
    pub clan: Option<ClanRef>,
    pub arena: Option<Arena>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub current_deck: Vec<Card>,
    pub current_favourite_card: Option<Card>,
    pub star_points: Option<u32>,
}

impl Player {
    pub fn win_rate(&self) -> Option<f64> {
        win_rate(self.wins, self.losses)
    }
}
