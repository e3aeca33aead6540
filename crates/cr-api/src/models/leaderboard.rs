use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::{ClanRef, ParseError, Tag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Season {
    Current,
    Month(NaiveDate),
}

impl Season {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Season::Month)
    }
}

impl FromStr for Season {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("current") {
            return Ok(Season::Current);
        }
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !shaped {
            return Err(ParseError::InvalidSeason(s.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Season::Month)
            .map_err(|_| ParseError::InvalidSeason(s.to_string()))
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Current => write!(f, "current"),
            Season::Month(date) => write!(f, "{:04}-{:02}", date.year(), date.month()),
        }
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RankedPlayer {
    pub tag: Tag,
    pub name: String,
    pub rank: u32,
    pub exp_level: Option<u32>,
    pub elo_rating: Option<u32>,
    pub trophies: Option<u32>,
    pub clan: Option<ClanRef>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Leaderboard {
    #[serde(default)]
    pub items: Vec<RankedPlayer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_and_months() {
        assert_eq!("current".parse::<Season>(), Ok(Season::Current));
        assert_eq!("Current".parse::<Season>(), Ok(Season::Current));
        assert_eq!("2025-12".parse::<Season>(), Ok(Season::month(2025, 12).unwrap()));
        assert_eq!(Season::month(2025, 3).unwrap().to_string(), "2025-03");
        assert_eq!(Season::Current.to_string(), "current");
    }

    #[test]
    fn rejects_malformed_seasons() {
        for bad in ["", "2025-13", "2025-1", "25-12", "2025/12", "2025-12-01", "latest"] {
            assert!(bad.parse::<Season>().is_err(), "{bad} should not parse");
        }
    }
}
