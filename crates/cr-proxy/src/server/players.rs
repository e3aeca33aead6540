use axum::extract::{Path, State};
use cr_api::{
    models::{BattleLog, Card, Player, Tag},
    Api,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::envelope::{Envelope, ProxyError, ProxyResult};

#[instrument(skip(api))]
pub(crate) async fn player(Path(tag): Path<String>, State(api): State<Api>) -> ProxyResult<Player> {
    let tag = Tag::parse(&tag)?;
    let player = api
        .get_player(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "player data"))?;
    Ok(Envelope::ok(player))
}

#[instrument(skip(api))]
pub(crate) async fn battle_log(
    Path(tag): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<BattleLog> {
    let tag = Tag::parse(&tag)?;
    let log = api
        .get_battle_log(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "battle log"))?;
    Ok(Envelope::ok(log))
}

#[instrument(skip(api))]
pub(crate) async fn current_deck(
    Path(tag): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<Vec<Card>> {
    let tag = Tag::parse(&tag)?;
    let log = api
        .get_battle_log(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "current deck"))?;

    let Some(latest) = log.into_iter().next() else {
        info!("No battles on record");
        return Ok(Envelope::ok(Vec::new()).with_message("No recent battles found for this player"));
    };
    let battle_time = latest.battle_time_string();
    let game_mode = latest.game_mode.map(|mode| mode.name);
    let Some(me) = latest.team.into_iter().next() else {
        return Err(ProxyError::not_found("No team data found in the most recent battle"));
    };

    let mut envelope = Envelope::ok(me.cards)
        .with_extra("battleTime", battle_time)
        .with_extra("battleType", latest.battle_type);
    if let Some(game_mode) = game_mode {
        envelope = envelope.with_extra("gameMode", game_mode);
    }
    Ok(envelope)
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct PlayerStats {
    pub player_tag: Tag,
    pub player_name: String,
    pub current_trophies: u32,
    pub best_trophies: u32,
    pub total_battles: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub three_crown_wins: u32,
    pub win_rate: Option<f64>,
    pub recent_battles: usize,
    pub recent_wins: usize,
}

impl PlayerStats {
    fn new(player: Player, log: &BattleLog) -> Self {
        Self {
            win_rate: player.win_rate().map(|rate| (rate * 10.0).round() / 10.0),
            recent_battles: log.len(),
            recent_wins: log
                .iter()
                .filter(|b| b.team_crowns() > b.opponent_crowns())
                .count(),
            player_tag: player.tag,
            player_name: player.name,
            current_trophies: player.trophies,
            best_trophies: player.best_trophies,
            total_battles: player.battle_count,
            total_wins: player.wins,
            total_losses: player.losses,
            three_crown_wins: player.three_crown_wins,
        }
    }
}

#[instrument(skip(api))]
pub(crate) async fn stats(
    Path(tag): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<PlayerStats> {
    let tag = Tag::parse(&tag)?;
    let (player, log) = futures::try_join!(api.get_player(&tag), api.get_battle_log(&tag))
        .map_err(|e| ProxyError::upstream(e, "player stats"))?;
    Ok(Envelope::ok(PlayerStats::new(player, &log)))
}
