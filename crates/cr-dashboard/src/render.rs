use std::fmt::Write;

use cr_api::models::{BattleLog, Card, Player};

use crate::{
    catalog::{CardFilter, Catalog},
    clan::ClanView,
    leaderboard::LeaderboardView,
    level::linear_card_level,
    stats::{average_elixir, win_rate, Outcome},
    view::{Listing, PlayerView, Remote, Tab},
};

const NOT_AVAILABLE: &str = "N/A";

fn loading_or<T>(
    remote: &Remote<T>,
    absent: &str,
    out: &mut String,
    ready: impl FnOnce(&T, &mut String),
) {
    match remote {
        Remote::Absent => out.push_str(absent),
        Remote::Loading => out.push_str("Loading..."),
        Remote::Ready(value) => ready(value, out),
    }
}

fn banner(out: &mut String, banner: Option<&str>) {
    if let Some(message) = banner {
        let _ = writeln!(out, "! {message}");
    }
}

pub fn player_view(view: &PlayerView) -> String {
    let mut out = String::new();
    banner(&mut out, view.banner());
    let Some(selection) = view.selection() else {
        out.push_str("Search for a player by tag.");
        return out;
    };

    loading_or(selection.player(), "Player not loaded.", &mut out, |player, out| {
        let _ = writeln!(out, "{} ({})", player.name, player.tag);
        let _ = writeln!(out, "[{}]", selection.active().label());
        match selection.active() {
            Tab::Stats => stats(player, out),
            Tab::Badges => badges(player, out),
            Tab::Deck => loading_or(selection.deck(), "No deck loaded.", out, |d, out| deck(d, out)),
            Tab::BattleLog => {
                loading_or(selection.battle_log(), "No battles loaded.", out, |log, out| {
                    battle_log(log, out)
                })
            }
        }
    });
    out
}

fn stats(player: &Player, out: &mut String) {
    let rate = win_rate(player.wins, player.losses)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.1}%"));
    let _ = writeln!(out, "Level        {}", player.exp_level);
    let _ = writeln!(out, "Trophies     {} (best {})", player.trophies, player.best_trophies);
    let _ = writeln!(out, "Wins/Losses  {}/{}", player.wins, player.losses);
    let _ = writeln!(out, "Win rate     {rate}");
    let _ = writeln!(out, "Three crowns {}", player.three_crown_wins);
    let arena = player.arena.as_ref().map_or(NOT_AVAILABLE, |a| a.name.as_str());
    let _ = writeln!(out, "Arena        {arena}");
    let clan = player.clan.as_ref().map_or(NOT_AVAILABLE, |c| c.name.as_str());
    let _ = writeln!(out, "Clan         {clan}");
}

fn badges(player: &Player, out: &mut String) {
    if player.badges.is_empty() {
        out.push_str("No badges earned yet.\n");
        return;
    }
    for badge in &player.badges {
        match (badge.level, badge.max_level) {
            (Some(level), Some(max)) => {
                let _ = writeln!(out, "{} {level}/{max}", badge.name);
            }
            _ => {
                let _ = writeln!(out, "{}", badge.name);
            }
        }
    }
}

fn deck(cards: &[Card], out: &mut String) {
    if cards.is_empty() {
        out.push_str("No recent battles to take a deck from.\n");
        return;
    }
    for card in cards {
        let level = linear_card_level(card)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |l| format!("Lvl {l}"));
        let _ = writeln!(out, "{:<20} {level}", card.name);
    }
    if let Some(avg) = average_elixir(cards) {
        let _ = writeln!(out, "Average elixir {avg:.1}");
    }
}

fn battle_log(log: &BattleLog, out: &mut String) {
    if log.is_empty() {
        out.push_str("No recent battles.\n");
        return;
    }
    for battle in log {
        let opponent = battle
            .opponent
            .first()
            .map_or(NOT_AVAILABLE, |p| p.name.as_str());
        let _ = writeln!(
            out,
            "{} {}-{} vs {opponent} ({}, {})",
            Outcome::of(battle).label(),
            battle.team_crowns(),
            battle.opponent_crowns(),
            battle.battle_type,
            battle.battle_time.format("%Y-%m-%d %H:%M"),
        );
    }
}

pub fn clan_view(view: &ClanView) -> String {
    let mut out = String::new();
    banner(&mut out, view.banner());
    loading_or(view.clan(), "Search for a clan by tag.", &mut out, |clan, out| {
        let _ = writeln!(out, "{} ({}) {} members", clan.name, clan.tag, clan.members);
        if let Some(description) = &clan.description {
            let _ = writeln!(out, "{description}");
        }
    });
    match view.members() {
        Some(Listing::Rows(rows)) => {
            for row in rows {
                let _ = writeln!(
                    out,
                    "{:>2}. {:<16} {:<10} {:>5} trophies {:>4} donated  {}",
                    row.rank, row.name, row.role, row.trophies, row.donations, row.tag
                );
            }
        }
        Some(Listing::Empty(message)) => {
            let _ = writeln!(out, "{message}");
        }
        None => {}
    }
    out
}

pub fn leaderboard_view(view: &LeaderboardView) -> String {
    let mut out = String::new();
    banner(&mut out, view.banner());
    let _ = writeln!(out, "Path of Legends, season {}", view.season());
    match view.rows() {
        None => {
            loading_or(view.board(), "Leaderboard not loaded.", &mut out, |_, _| {});
        }
        Some(Listing::Empty(message)) => {
            let _ = writeln!(out, "{message}");
        }
        Some(Listing::Rows(rows)) => {
            for row in rows {
                let rating = row
                    .rating
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |r| r.to_string());
                let clan = row.clan.as_deref().unwrap_or("");
                let _ = writeln!(out, "{:>4}. {:<16} {rating:>5}  {clan}", row.rank, row.name);
                if view.expanded() != Some(&row.tag) {
                    continue;
                }
                if view.is_deck_loading(&row.tag) {
                    out.push_str("      Loading deck...\n");
                } else if let Some(preview) = view.preview(&row.tag) {
                    for card in preview {
                        let level = card
                            .level
                            .map_or_else(|| NOT_AVAILABLE.to_string(), |l| l.to_string());
                        let _ = writeln!(out, "      {:<20} {level}", card.name);
                    }
                } else {
                    out.push_str("      Deck unavailable.\n");
                }
            }
        }
    }
    out
}

pub fn catalog_view(catalog: &Catalog, filter: &CardFilter) -> String {
    let mut out = String::new();
    banner(&mut out, catalog.banner());
    match catalog.filtered(filter) {
        None => loading_or(catalog.cards(), "Cards not loaded.", &mut out, |_, _| {}),
        Some(Listing::Empty(message)) => {
            let _ = writeln!(out, "{message}");
        }
        Some(Listing::Rows(cards)) => {
            for card in cards {
                let cost = card
                    .elixir_cost
                    .map_or_else(|| "-".to_string(), |c| c.to_string());
                let rarity = card.rarity.as_deref().unwrap_or(NOT_AVAILABLE);
                let _ = writeln!(out, "{cost:>2}  {:<20} {rarity}", card.name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{tests, RefetchPolicy, Response};

    #[test]
    fn deck_tab_shows_linear_levels() {
        let mut view = PlayerView::new(RefetchPolicy::Cached);
        let request = view.search("2PP").unwrap();
        view.complete(request.ticket, Ok(Response::Player(tests::player("#2PP"))));
        let request = view.select_tab(Tab::Deck).unwrap();
        assert!(player_view(&view).contains("Loading..."));

        view.complete(request.ticket, Ok(Response::Deck(tests::deck())));
        let text = player_view(&view);
        assert!(text.contains("[Current Deck]"));
        assert!(text.contains("Knight"));
        assert!(text.contains("Lvl 15"));
        assert!(text.contains("Average elixir 3.0"));
    }

    #[test]
    fn stats_and_badges_render_from_player() {
        let mut view = PlayerView::new(RefetchPolicy::Cached);
        let request = view.search("2PP").unwrap();
        view.complete(request.ticket, Ok(Response::Player(tests::player("#2PP"))));

        let text = player_view(&view);
        assert!(text.contains("Win rate     75.0%"));
        assert!(text.contains("Clan         N/A"));

        view.select_tab(Tab::Badges);
        assert!(player_view(&view).contains("Classic12Wins 2/8"));
    }

    #[test]
    fn empty_states_are_spelled_out() {
        assert_eq!(
            player_view(&PlayerView::default()),
            "Search for a player by tag."
        );
        assert!(clan_view(&ClanView::default()).contains("Search for a clan"));
        assert!(leaderboard_view(&LeaderboardView::default()).contains("not loaded"));
    }
}
