use cr_api::models::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Champion,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Champion,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub const fn max_level(self) -> i32 {
        match self {
            Rarity::Common => 15,
            Rarity::Rare => 13,
            Rarity::Epic => 10,
            Rarity::Legendary => 8,
            Rarity::Champion => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Champion => "champion",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `16 - (max - level)`. An explicit `max_level` wins over the rarity table.
/// Falls back to the raw level when neither gives a max. Not clamped.
pub fn linear_display_level(rarity: &str, level: i32, max_level: Option<i32>) -> i32 {
    let max = max_level.or_else(|| Rarity::parse(rarity).map(Rarity::max_level));
    match max {
        Some(max) => 16i32.saturating_sub(max.saturating_sub(level)),
        None => level,
    }
}

/// `15` for cards at or one below max, otherwise `level / max * 15` rounded
/// half up. The max always comes from the rarity table; unknown rarities
/// keep their raw level.
pub fn proportional_display_level(rarity: &str, level: i32) -> i32 {
    let Some(max) = Rarity::parse(rarity).map(Rarity::max_level) else {
        return level;
    };
    if level >= max - 1 {
        return 15;
    }
    (f64::from(level) * 15.0 / f64::from(max) + 0.5).floor() as i32
}

pub fn linear_card_level(card: &Card) -> Option<i32> {
    let rarity = card.rarity.as_deref().unwrap_or_default();
    card.level
        .map(|level| linear_display_level(rarity, level, card.max_level))
}

pub fn proportional_card_level(card: &Card) -> Option<i32> {
    let rarity = card.rarity.as_deref().unwrap_or_default();
    card.level
        .map(|level| proportional_display_level(rarity, level))
}
