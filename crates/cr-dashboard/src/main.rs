use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cr_api::models::Tag;
use cr_dashboard::{
    catalog::{CardFilter, Catalog},
    clan::ClanView,
    gateway::{HttpGateway, DEFAULT_PROXY_URL},
    leaderboard::LeaderboardView,
    level::Rarity,
    render,
    view::{self, PlayerView, RefetchPolicy, Request, Session, Tab},
    Gateway,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Clash Royale stats in the terminal")]
struct Args {
    /// Base URL of the proxy
    #[arg(long, env = "CR_PROXY_URL", default_value = DEFAULT_PROXY_URL)]
    proxy: String,
    /// Fetch tab data on every visit instead of once per player
    #[arg(long)]
    refetch: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a player by tag
    Player {
        tag: String,
        #[arg(long, value_enum, default_value_t = TabArg::Stats)]
        tab: TabArg,
    },
    /// Show a clan and its members
    Clan {
        tag: String,
        /// Open this member's player view
        #[arg(long)]
        member: Option<String>,
        #[arg(long, value_enum, default_value_t = TabArg::Stats)]
        tab: TabArg,
    },
    /// Browse the card catalog
    Cards {
        #[arg(long, value_parser = parse_rarity)]
        rarity: Option<Rarity>,
        /// Part of a card name
        #[arg(long)]
        name: Option<String>,
    },
    /// Path of Legends standings
    Leaderboard {
        /// `current` or YYYY-MM
        #[arg(default_value = "current")]
        season: String,
        /// Show the current deck of this player
        #[arg(long)]
        expand: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TabArg {
    Stats,
    Deck,
    Battlelog,
    Badges,
}

impl From<TabArg> for Tab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Stats => Tab::Stats,
            TabArg::Deck => Tab::Deck,
            TabArg::Battlelog => Tab::BattleLog,
            TabArg::Badges => Tab::Badges,
        }
    }
}

fn parse_rarity(s: &str) -> Result<Rarity, String> {
    Rarity::parse(s).ok_or_else(|| {
        let known: Vec<_> = Rarity::ALL.iter().map(|r| r.as_str()).collect();
        format!("unknown rarity {s:?}, expected one of {}", known.join(", "))
    })
}

async fn drive(gateway: &HttpGateway, players: &mut PlayerView, request: Option<Request>) {
    if let Some(request) = request {
        let result = view::fetch(gateway, &request).await;
        players.complete(request.ticket, result);
    }
}

fn finish(output: String, failed: bool) -> ExitCode {
    println!("{output}");
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let gateway = HttpGateway::new(&args.proxy)?;
    let policy = if args.refetch {
        RefetchPolicy::Always
    } else {
        RefetchPolicy::Cached
    };

    let code = match args.command {
        Command::Player { tag, tab } => {
            let mut session = Session::new(gateway, policy);
            session.search(&tag).await;
            session.select_tab(tab.into()).await;
            let players = session.view();
            finish(render::player_view(players), players.banner().is_some())
        }
        Command::Clan { tag, member, tab } => {
            let mut clan = ClanView::default();
            clan.load(&gateway, &tag).await;
            let mut output = render::clan_view(&clan);
            let mut failed = clan.banner().is_some();

            if let Some(member) = member {
                let mut players = PlayerView::new(policy);
                let opened = Tag::parse(&member)
                    .ok()
                    .and_then(|tag| clan.open_member(&tag, &mut players));
                match opened {
                    Some(request) => {
                        drive(&gateway, &mut players, Some(request)).await;
                        let request = players.select_tab(tab.into());
                        drive(&gateway, &mut players, request).await;
                        output.push('\n');
                        output.push_str(&render::player_view(&players));
                        failed |= players.banner().is_some();
                    }
                    None => {
                        output.push_str(&format!("\nNo member {member} in this clan."));
                        failed = true;
                    }
                }
            }
            finish(output, failed)
        }
        Command::Cards { rarity, name } => {
            let mut catalog = Catalog::default();
            catalog.load(&gateway).await;
            let filter = CardFilter { rarity, name };
            finish(render::catalog_view(&catalog, &filter), catalog.banner().is_some())
        }
        Command::Leaderboard { season, expand } => {
            let mut board = LeaderboardView::default();
            match board.choose_season(&season) {
                Ok(request) => {
                    let result = gateway.leaderboard(request.season).await;
                    board.complete_board(&request, result);
                    if let Some(tag) = expand.as_deref().map(Tag::parse).transpose()? {
                        board.expand(&gateway, tag).await;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Rejected season"),
            }
            finish(render::leaderboard_view(&board), board.banner().is_some())
        }
    };
    Ok(code)
}
