use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod player;
pub use player::*;

mod card;
pub use card::*;

mod battle;
pub use battle::*;

mod clan;
pub use clan::*;

mod leaderboard;
pub use leaderboard::*;

mod tournament;
pub use tournament::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Please enter a tag")]
    EmptyTag,
    #[error("Tags may only contain letters and digits, found {0:?}")]
    InvalidTagChar(char),
    #[error("Season must be \"current\" or YYYY-MM, got {0:?}")]
    InvalidSeason(String),
}

/// A player or clan tag, stored without the leading `#` and in upper case.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
        if bare.is_empty() {
            return Err(ParseError::EmptyTag);
        }
        if let Some(c) = bare.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidTagChar(c));
        }
        Ok(Self(bare.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hashed(&self) -> String {
        format!("#{}", self.0)
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for Tag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Arena {
    pub id: u32,
    pub name: String,
}
