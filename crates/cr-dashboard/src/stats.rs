use std::cmp::Ordering;

use cr_api::models::{Battle, Card};

pub use cr_api::models::{role_rank, win_rate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn of(battle: &Battle) -> Self {
        match battle.team_crowns().cmp(&battle.opponent_crowns()) {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Loss,
            Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Victory",
            Outcome::Loss => "Defeat",
            Outcome::Draw => "Draw",
        }
    }
}

/// Cheapest first. Cards without a cost go last, ties break on name.
pub fn sort_by_elixir(cards: &mut [Card]) {
    cards.sort_by(|a, b| match (a.elixir_cost, b.elixir_cost) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

pub fn average_elixir(cards: &[Card]) -> Option<f64> {
    let costs: Vec<u32> = cards.iter().filter_map(|c| c.elixir_cost).collect();
    if costs.is_empty() {
        return None;
    }
    Some(f64::from(costs.iter().sum::<u32>()) / costs.len() as f64)
}

pub fn role_label(role: &str) -> &str {
    match role {
        "leader" => "Leader",
        "coLeader" => "Co-Leader",
        "elder" => "Elder",
        "member" => "Member",
        other => other,
    }
}
