use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::{Arena, Tag};

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: u32,
    pub name: String,
    pub is_country: Option<bool>,
    pub country_code: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub tag: Tag,
    pub name: String,
    pub role: String,
    pub last_seen: Option<String>,
    pub exp_level: u32,
    pub trophies: u32,
    pub arena: Option<Arena>,
    pub clan_rank: u32,
    #[serde(default)]
    pub previous_clan_rank: u32,
    #[serde(default)]
    pub donations: u32,
    #[serde(default)]
    pub donations_received: u32,
}

pub fn role_rank(role: &str) -> u8 {
    match role {
        "leader" => 0,
        "coLeader" => 1,
        "elder" => 2,
        "member" => 3,
        _ => 4,
    }
}

impl Member {
    pub fn role_rank(&self) -> u8 {
        role_rank(&self.role)
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    pub tag: Tag,
    pub name: String,
    #[serde(rename = "type")]
    pub clan_type: Option<String>,
    pub description: Option<String>,
    pub badge_id: Option<u32>,
    #[serde(default)]
    pub clan_score: u32,
    #[serde(default)]
    pub clan_war_trophies: u32,
    pub location: Option<Location>,
    #[serde(default)]
    pub required_trophies: u32,
    #[serde(default)]
    pub donations_per_week: u32,
    #[serde(default)]
    pub members: u32,
    #[serde(default)]
    pub member_list: Vec<Member>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarLogEntry {
    pub season_id: Option<u32>,
    pub created_date: Option<String>,
    #[serde(default)]
    pub participants: Vec<serde_json::Value>,
    #[serde(default)]
    pub standings: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WarLog {
    #[serde(default)]
    pub items: Vec<WarLogEntry>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CurrentWar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub rest: HashMap<String, serde_json::Value>,
}
