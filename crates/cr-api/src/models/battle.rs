use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::{Arena, Card, ClanRef, Tag};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameMode {
    pub id: u32,
    pub name: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BattleParticipant {
    pub tag: Tag,
    pub name: String,
    pub crowns: u32,
    pub starting_trophies: Option<i32>,
    pub trophy_change: Option<i32>,
    pub king_tower_hit_points: Option<u32>,
    pub clan: Option<ClanRef>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    #[serde(rename = "type")]
    pub battle_type: String,
    #[serde(with = "battle_time")]
    pub battle_time: DateTime<Utc>,
    pub is_ladder_tournament: Option<bool>,
    pub arena: Option<Arena>,
    pub game_mode: Option<GameMode>,
    pub deck_selection: Option<String>,
    #[serde(default)]
    pub team: Vec<BattleParticipant>,
    #[serde(default)]
    pub opponent: Vec<BattleParticipant>,
}

impl Battle {
    pub fn team_crowns(&self) -> u32 {
        self.team.iter().map(|p| p.crowns).max().unwrap_or(0)
    }

    pub fn opponent_crowns(&self) -> u32 {
        self.opponent.iter().map(|p| p.crowns).max().unwrap_or(0)
    }

    pub fn battle_time_string(&self) -> String {
        self.battle_time.format(battle_time::FORMAT).to_string()
    }
}

pub type BattleLog = Vec<Battle>;

/// Upstream timestamps look like `20240312T184512.000Z`.
mod battle_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) const FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, "%Y%m%dT%H%M%S%.fZ")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("bad battle time {raw:?}: {e}")))
    }
}
