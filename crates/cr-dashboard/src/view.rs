use cr_api::models::{BattleLog, Card, ParseError, Player, Tag};
use tracing::{debug, info, instrument};

use crate::gateway::{self, Gateway};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Stats,
    Deck,
    BattleLog,
    Badges,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Stats => "Stats",
            Tab::Deck => "Current Deck",
            Tab::BattleLog => "Battle Log",
            Tab::Badges => "Badges",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefetchPolicy {
    #[default]
    Cached,
    Always,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Remote<T> {
    #[default]
    Absent,
    Loading,
    Ready(T),
}

impl<T> Remote<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Rows(Vec<T>),
    Empty(&'static str),
}

impl<T> Listing<T> {
    pub fn from_rows(rows: Vec<T>, empty: &'static str) -> Self {
        if rows.is_empty() {
            Listing::Empty(empty)
        } else {
            Listing::Rows(rows)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Search,
    ClanMembers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Player,
    Deck,
    BattleLog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    tag: Tag,
    fetch: Fetch,
}

impl Ticket {
    pub fn fetch(&self) -> Fetch {
        self.fetch
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub ticket: Ticket,
}

impl Request {
    pub fn tag(&self) -> &Tag {
        &self.ticket.tag
    }

    pub fn fetch(&self) -> Fetch {
        self.ticket.fetch
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Player(Player),
    Deck(Vec<Card>),
    BattleLog(BattleLog),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    tag: Tag,
    origin: Origin,
    active: Tab,
    player: Remote<Player>,
    deck: Remote<Vec<Card>>,
    battle_log: Remote<BattleLog>,
}

impl Selection {
    fn new(tag: Tag, origin: Origin) -> Self {
        Self {
            tag,
            origin,
            active: Tab::Stats,
            player: Remote::Loading,
            deck: Remote::Absent,
            battle_log: Remote::Absent,
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn player(&self) -> &Remote<Player> {
        &self.player
    }

    pub fn deck(&self) -> &Remote<Vec<Card>> {
        &self.deck
    }

    pub fn battle_log(&self) -> &Remote<BattleLog> {
        &self.battle_log
    }
}

#[derive(Debug, Default)]
pub struct PlayerView {
    policy: RefetchPolicy,
    generation: u64,
    selection: Option<Selection>,
    banner: Option<String>,
}

impl PlayerView {
    pub fn new(policy: RefetchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> RefetchPolicy {
        self.policy
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn search(&mut self, input: &str) -> Result<Request, ParseError> {
        match Tag::parse(input) {
            Ok(tag) => Ok(self.select(tag, Origin::Search)),
            Err(e) => {
                self.banner = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn open_member(&mut self, tag: Tag) -> Request {
        self.select(tag, Origin::ClanMembers)
    }

    #[instrument(skip(self))]
    fn select(&mut self, tag: Tag, origin: Origin) -> Request {
        self.generation += 1;
        self.banner = None;
        info!(generation = self.generation, "Selecting player");
        self.selection = Some(Selection::new(tag.clone(), origin));
        self.request(tag, Fetch::Player)
    }

    fn request(&self, tag: Tag, fetch: Fetch) -> Request {
        Request {
            ticket: Ticket {
                generation: self.generation,
                tag,
                fetch,
            },
        }
    }

    pub fn select_tab(&mut self, tab: Tab) -> Option<Request> {
        let policy = self.policy;
        let selection = self.selection.as_mut()?;
        selection.active = tab;
        if matches!(selection.player, Remote::Absent) {
            debug!(?tab, "Player lookup failed, not fetching tab data");
            return None;
        }

        let (slot_absent, slot_loading, fetch) = match tab {
            Tab::Stats | Tab::Badges => return None,
            Tab::Deck => (
                matches!(selection.deck, Remote::Absent),
                selection.deck.is_loading(),
                Fetch::Deck,
            ),
            Tab::BattleLog => (
                matches!(selection.battle_log, Remote::Absent),
                selection.battle_log.is_loading(),
                Fetch::BattleLog,
            ),
        };
        let needed = match policy {
            RefetchPolicy::Cached => slot_absent,
            RefetchPolicy::Always => !slot_loading,
        };
        if !needed {
            debug!(?tab, "Reusing tab data");
            return None;
        }

        match fetch {
            Fetch::Deck => selection.deck = Remote::Loading,
            Fetch::BattleLog => selection.battle_log = Remote::Loading,
            Fetch::Player => {}
        }
        let tag = selection.tag.clone();
        self.banner = None;
        Some(self.request(tag, fetch))
    }

    pub fn back(&mut self) -> Option<Origin> {
        let selection = self.selection.take()?;
        self.generation += 1;
        self.banner = None;
        Some(selection.origin)
    }

    /// Applies a response. Returns `false` when it was for a selection that
    /// is no longer current and has been ignored.
    pub fn complete(&mut self, ticket: Ticket, result: gateway::Result<Response>) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            debug!(?ticket, "Dropping response with nothing selected");
            return false;
        };
        if ticket.generation != self.generation || ticket.tag != selection.tag {
            debug!(?ticket, "Dropping stale response");
            return false;
        }

        match (ticket.fetch, result) {
            (Fetch::Player, Ok(Response::Player(player))) => {
                selection.player = Remote::Ready(player)
            }
            (Fetch::Deck, Ok(Response::Deck(deck))) => selection.deck = Remote::Ready(deck),
            (Fetch::BattleLog, Ok(Response::BattleLog(log))) => {
                selection.battle_log = Remote::Ready(log)
            }
            (fetch, Ok(_)) => {
                debug!(?fetch, "Dropping response of the wrong kind");
                return false;
            }
            (fetch, Err(e)) => {
                tracing::error!(error = %e, ?fetch, "Fetch failed");
                match fetch {
                    Fetch::Player => selection.player = Remote::Absent,
                    Fetch::Deck => selection.deck = Remote::Absent,
                    Fetch::BattleLog => selection.battle_log = Remote::Absent,
                }
                self.banner = Some(e.banner());
            }
        }
        true
    }
}

pub async fn fetch<G: Gateway>(gateway: &G, request: &Request) -> gateway::Result<Response> {
    let tag = request.tag();
    match request.fetch() {
        Fetch::Player => gateway.player(tag).await.map(Response::Player),
        Fetch::Deck => gateway.current_deck(tag).await.map(Response::Deck),
        Fetch::BattleLog => gateway.battle_log(tag).await.map(Response::BattleLog),
    }
}

#[derive(Debug)]
pub struct Session<G> {
    gateway: G,
    view: PlayerView,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G, policy: RefetchPolicy) -> Self {
        Self {
            gateway,
            view: PlayerView::new(policy),
        }
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    async fn run(&mut self, request: Request) {
        let result = fetch(&self.gateway, &request).await;
        self.view.complete(request.ticket, result);
    }

    pub async fn search(&mut self, input: &str) {
        if let Ok(request) = self.view.search(input) {
            self.run(request).await;
        }
    }

    pub async fn open_member(&mut self, tag: Tag) {
        let request = self.view.open_member(tag);
        self.run(request).await;
    }

    pub async fn select_tab(&mut self, tab: Tab) {
        if let Some(request) = self.view.select_tab(tab) {
            self.run(request).await;
        }
    }

    pub fn back(&mut self) -> Option<Origin> {
        self.view.back()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use cr_api::models::{CardList, Clan, Leaderboard, Season};

    use super::*;
    use crate::gateway::Error;

    pub(crate) fn player(tag: &str) -> Player {
        serde_json::from_value(serde_json::json!({
            "tag": tag,
            "name": format!("player {tag}"),
            "expLevel": 50,
            "trophies": 9000,
            "bestTrophies": 9100,
            "wins": 30,
            "losses": 10,
            "badges": [{"name": "Classic12Wins", "level": 2, "maxLevel": 8}]
        }))
        .unwrap()
    }

    pub(crate) fn deck() -> Vec<Card> {
        vec![Card {
            name: "Knight".into(),
            rarity: Some("common".into()),
            level: Some(14),
            max_level: Some(15),
            elixir_cost: Some(3),
            ..Card::default()
        }]
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeGateway {
        pub player_calls: AtomicUsize,
        pub deck_calls: AtomicUsize,
        pub battle_log_calls: AtomicUsize,
        pub clan_calls: AtomicUsize,
        pub fail_deck: Mutex<bool>,
        pub clan: Mutex<Option<Clan>>,
        pub leaderboard: Mutex<Option<Leaderboard>>,
        pub cards: Mutex<Option<CardList>>,
    }

    impl Gateway for FakeGateway {
        async fn player(&self, tag: &Tag) -> gateway::Result<Player> {
            self.player_calls.fetch_add(1, Ordering::SeqCst);
            if tag.as_str() == "MISSING" {
                return Err(Error::Upstream("Resource not found.".into()));
            }
            Ok(player(&tag.to_string()))
        }

        async fn current_deck(&self, _tag: &Tag) -> gateway::Result<Vec<Card>> {
            self.deck_calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_deck.lock().unwrap() {
                return Err(Error::Upstream("Rate limit exceeded.".into()));
            }
            Ok(deck())
        }

        async fn battle_log(&self, _tag: &Tag) -> gateway::Result<BattleLog> {
            self.battle_log_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn clan(&self, _tag: &Tag) -> gateway::Result<Clan> {
            self.clan_calls.fetch_add(1, Ordering::SeqCst);
            let clan = self.clan.lock().unwrap().clone();
            clan.ok_or_else(|| Error::Upstream("Resource not found.".into()))
        }

        async fn cards(&self) -> gateway::Result<CardList> {
            Ok(self.cards.lock().unwrap().clone().unwrap_or_default())
        }

        async fn leaderboard(&self, _season: Season) -> gateway::Result<Leaderboard> {
            let board = self.leaderboard.lock().unwrap().clone();
            board.ok_or_else(|| Error::Upstream("Resource not found.".into()))
        }
    }

    fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn search_opens_on_stats() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Cached);
        session.search("#2pp").await;

        let selection = session.view().selection().unwrap();
        assert_eq!(selection.active(), Tab::Stats);
        assert_eq!(selection.origin(), Origin::Search);
        assert_eq!(selection.player().ready().unwrap().name, "player #2PP");
        assert_eq!(selection.deck(), &Remote::Absent);
        assert_eq!(calls(&session.gateway().player_calls), 1);
    }

    #[tokio::test]
    async fn blank_search_never_reaches_the_gateway() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Cached);
        session.search("  # ").await;
        assert_eq!(session.view().banner(), Some("Please enter a tag"));
        assert!(session.view().selection().is_none());
        assert_eq!(calls(&session.gateway().player_calls), 0);
    }

    #[tokio::test]
    async fn cached_policy_fetches_deck_once() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Cached);
        session.search("2PP").await;
        session.select_tab(Tab::Deck).await;
        session.select_tab(Tab::Stats).await;
        session.select_tab(Tab::Deck).await;

        assert_eq!(calls(&session.gateway().deck_calls), 1);
        let selection = session.view().selection().unwrap();
        assert_eq!(selection.active(), Tab::Deck);
        assert_eq!(selection.deck().ready().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn always_policy_fetches_deck_on_every_click() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Always);
        session.search("2PP").await;
        session.select_tab(Tab::Deck).await;
        session.select_tab(Tab::Stats).await;
        session.select_tab(Tab::Deck).await;

        assert_eq!(calls(&session.gateway().deck_calls), 2);
    }

    #[tokio::test]
    async fn badges_and_stats_need_no_fetch() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Always);
        session.search("2PP").await;
        session.select_tab(Tab::Badges).await;
        session.select_tab(Tab::Stats).await;
        assert_eq!(calls(&session.gateway().player_calls), 1);
        assert_eq!(calls(&session.gateway().deck_calls), 0);
        assert_eq!(calls(&session.gateway().battle_log_calls), 0);
    }

    #[tokio::test]
    async fn failed_tab_raises_banner_and_retries_on_click() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Cached);
        session.search("2PP").await;

        *session.gateway().fail_deck.lock().unwrap() = true;
        session.select_tab(Tab::Deck).await;
        assert_eq!(session.view().banner(), Some("Rate limit exceeded."));
        assert_eq!(session.view().selection().unwrap().deck(), &Remote::Absent);

        *session.gateway().fail_deck.lock().unwrap() = false;
        session.select_tab(Tab::Deck).await;
        assert_eq!(session.view().banner(), None);
        assert!(session.view().selection().unwrap().deck().ready().is_some());
        assert_eq!(calls(&session.gateway().deck_calls), 2);
    }

    #[tokio::test]
    async fn unknown_player_tabs_do_not_fetch() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Always);
        session.search("MISSING").await;
        assert_eq!(session.view().banner(), Some("Resource not found."));

        session.select_tab(Tab::Deck).await;
        session.select_tab(Tab::BattleLog).await;
        assert_eq!(calls(&session.gateway().deck_calls), 0);
        assert_eq!(calls(&session.gateway().battle_log_calls), 0);

        let selection = session.view().selection().unwrap();
        assert_eq!(selection.active(), Tab::BattleLog);
        assert_eq!(selection.deck(), &Remote::Absent);
        assert_eq!(session.view().banner(), Some("Resource not found."));
    }

    #[tokio::test]
    async fn back_clears_tab_data_and_returns_to_origin() {
        let mut session = Session::new(FakeGateway::default(), RefetchPolicy::Cached);
        session.open_member(Tag::parse("#ABC").unwrap()).await;
        session.select_tab(Tab::BattleLog).await;

        assert_eq!(session.back(), Some(Origin::ClanMembers));
        assert!(session.view().selection().is_none());
        assert_eq!(session.back(), None);

        session.open_member(Tag::parse("#ABC").unwrap()).await;
        let selection = session.view().selection().unwrap();
        assert_eq!(selection.active(), Tab::Stats);
        assert_eq!(selection.battle_log(), &Remote::Absent);
    }

    #[test]
    fn stale_deck_is_discarded_after_switching_player() {
        let mut view = PlayerView::new(RefetchPolicy::Cached);
        let a = view.search("AAA").unwrap();
        view.complete(a.ticket, Ok(Response::Player(player("#AAA"))));
        let a_deck = view.select_tab(Tab::Deck).unwrap();

        let b = view.search("BBB").unwrap();
        assert!(!view.complete(a_deck.ticket, Ok(Response::Deck(deck()))));

        let selection = view.selection().unwrap();
        assert_eq!(selection.tag().as_str(), "BBB");
        assert_eq!(selection.deck(), &Remote::Absent);
        assert!(selection.player().is_loading());

        assert!(view.complete(b.ticket, Ok(Response::Player(player("#BBB")))));
    }

    #[test]
    fn response_for_an_earlier_visit_of_the_same_player_is_discarded() {
        let mut view = PlayerView::new(RefetchPolicy::Cached);
        let first = view.search("AAA").unwrap();
        view.back();
        let second = view.search("AAA").unwrap();

        assert!(!view.complete(first.ticket, Ok(Response::Player(player("#AAA")))));
        assert!(view.selection().unwrap().player().is_loading());
        assert!(view.complete(second.ticket, Ok(Response::Player(player("#AAA")))));
    }

    #[test]
    fn deck_in_flight_is_not_requested_twice() {
        let mut view = PlayerView::new(RefetchPolicy::Cached);
        view.search("AAA").unwrap();
        assert!(view.select_tab(Tab::Deck).is_some());
        assert!(view.select_tab(Tab::Stats).is_none());
        assert!(view.select_tab(Tab::Deck).is_none());
    }

    #[test]
    fn tabs_without_selection_do_nothing() {
        let mut view = PlayerView::default();
        assert_eq!(view.policy(), RefetchPolicy::Cached);
        assert!(view.select_tab(Tab::Deck).is_none());
        assert!(!view.complete(
            Ticket {
                generation: 0,
                tag: Tag::parse("A").unwrap(),
                fetch: Fetch::Deck
            },
            Ok(Response::Deck(deck()))
        ));
    }
}
