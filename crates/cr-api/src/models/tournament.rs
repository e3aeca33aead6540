use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::Tag;

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub tag: Tag,
    pub name: String,
    #[serde(rename = "type")]
    pub tournament_type: Option<String>,
    pub status: Option<String>,
    pub creator_tag: Option<String>,
    pub level_cap: Option<u32>,
    pub capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub preparation_duration: Option<u32>,
    pub duration: Option<u32>,
    pub created_time: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentList {
    #[serde(default)]
    pub items: Vec<Tournament>,
}
