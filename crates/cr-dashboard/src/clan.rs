use cr_api::models::{Clan, ParseError, Tag};
use tracing::{debug, instrument};

use crate::{
    gateway::{self, Gateway},
    stats::role_label,
    view::{Listing, PlayerView, Remote, Request},
};

pub const NO_MEMBERS: &str = "This clan has no members.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub rank: u32,
    pub tag: Tag,
    pub name: String,
    pub role: String,
    pub trophies: u32,
    pub donations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanRequest {
    pub tag: Tag,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct ClanView {
    generation: u64,
    clan: Remote<Clan>,
    banner: Option<String>,
}

impl ClanView {
    pub fn clan(&self) -> &Remote<Clan> {
        &self.clan
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn search(&mut self, input: &str) -> Result<ClanRequest, ParseError> {
        let tag = Tag::parse(input).map_err(|e| {
            self.banner = Some(e.to_string());
            e
        })?;
        self.generation += 1;
        self.banner = None;
        self.clan = Remote::Loading;
        Ok(ClanRequest {
            tag,
            generation: self.generation,
        })
    }

    pub fn complete(&mut self, request: &ClanRequest, result: gateway::Result<Clan>) -> bool {
        if request.generation != self.generation {
            debug!(tag = %request.tag, "Dropping stale clan");
            return false;
        }
        match result {
            Ok(clan) => self.clan = Remote::Ready(clan),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load clan");
                self.clan = Remote::Absent;
                self.banner = Some(e.banner());
            }
        }
        true
    }

    #[instrument(skip(self, gateway))]
    pub async fn load<G: Gateway>(&mut self, gateway: &G, input: &str) {
        if let Ok(request) = self.search(input) {
            let result = gateway.clan(&request.tag).await;
            self.complete(&request, result);
        }
    }

    pub fn members(&self) -> Option<Listing<MemberRow>> {
        let clan = self.clan.ready()?;
        let mut rows: Vec<MemberRow> = clan
            .member_list
            .iter()
            .map(|m| MemberRow {
                rank: m.clan_rank,
                tag: m.tag.clone(),
                name: m.name.clone(),
                role: role_label(&m.role).to_string(),
                trophies: m.trophies,
                donations: m.donations,
            })
            .collect();
        rows.sort_by_key(|row| row.rank);
        Some(Listing::from_rows(rows, NO_MEMBERS))
    }

    pub fn open_member(&self, tag: &Tag, players: &mut PlayerView) -> Option<Request> {
        let clan = self.clan.ready()?;
        let member = clan.member_list.iter().find(|m| &m.tag == tag)?;
        Some(players.open_member(member.tag.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{tests::FakeGateway, Origin, RefetchPolicy};

    fn clan(members: serde_json::Value) -> Clan {
        serde_json::from_value(serde_json::json!({
            "tag": "#CLAN",
            "name": "Clan",
            "memberList": members
        }))
        .unwrap()
    }

    fn member(tag: &str, rank: u32, role: &str) -> serde_json::Value {
        serde_json::json!({
            "tag": tag, "name": tag, "role": role, "expLevel": 40,
            "trophies": 5000, "clanRank": rank
        })
    }

    #[tokio::test]
    async fn members_listed_by_rank() {
        let gateway = FakeGateway::default();
        *gateway.clan.lock().unwrap() = Some(clan(serde_json::json!([
            member("#B", 2, "coLeader"),
            member("#A", 1, "leader"),
        ])));

        let mut view = ClanView::default();
        assert!(view.members().is_none());
        view.load(&gateway, "clan").await;

        let Some(Listing::Rows(rows)) = view.members() else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].name, "#A");
        assert_eq!(rows[1].role, "Co-Leader");
    }

    #[tokio::test]
    async fn empty_clan_shows_message() {
        let gateway = FakeGateway::default();
        *gateway.clan.lock().unwrap() = Some(clan(serde_json::json!([])));

        let mut view = ClanView::default();
        view.load(&gateway, "#CLAN").await;
        assert_eq!(view.members(), Some(Listing::Empty(NO_MEMBERS)));
    }

    #[tokio::test]
    async fn failures_and_bad_input_raise_banner() {
        let gateway = FakeGateway::default();
        let mut view = ClanView::default();

        view.load(&gateway, "").await;
        assert_eq!(view.banner(), Some("Please enter a tag"));
        assert_eq!(gateway.clan_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        view.load(&gateway, "#NONE").await;
        assert_eq!(view.banner(), Some("Resource not found."));
        assert_eq!(view.clan(), &Remote::Absent);
    }

    #[test]
    fn stale_clan_is_dropped() {
        let mut view = ClanView::default();
        let first = view.search("A").unwrap();
        let second = view.search("B").unwrap();
        assert!(!view.complete(&first, Ok(clan(serde_json::json!([])))));
        assert!(view.clan().is_loading());
        assert!(view.complete(&second, Ok(clan(serde_json::json!([])))));
    }

    #[test]
    fn member_click_opens_player_with_clan_origin() {
        let mut view = ClanView::default();
        let request = view.search("CLAN").unwrap();
        view.complete(&request, Ok(clan(serde_json::json!([member("#M1", 1, "member")]))));

        let mut players = PlayerView::new(RefetchPolicy::Cached);
        let tag = Tag::parse("m1").unwrap();
        let opened = view.open_member(&tag, &mut players).unwrap();
        assert_eq!(opened.tag(), &tag);
        assert_eq!(players.selection().unwrap().origin(), Origin::ClanMembers);
        assert_eq!(players.back(), Some(Origin::ClanMembers));

        assert!(view
            .open_member(&Tag::parse("nobody").unwrap(), &mut players)
            .is_none());
    }
}
