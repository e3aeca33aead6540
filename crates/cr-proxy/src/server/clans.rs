use std::cmp::Reverse;

use axum::extract::{Path, Query, State};
use cr_api::{
    models::{Clan, CurrentWar, Member, Tag, WarLog},
    Api,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::envelope::{Envelope, ProxyError, ProxyResult};

#[instrument(skip(api))]
pub(crate) async fn clan(Path(tag): Path<String>, State(api): State<Api>) -> ProxyResult<Clan> {
    let tag = Tag::parse(&tag)?;
    let clan = api
        .get_clan(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "clan data"))?;
    Ok(Envelope::ok(clan))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortBy {
    #[default]
    Trophies,
    Donations,
    Role,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Order {
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MembersQuery {
    #[serde(default)]
    sort_by: SortBy,
    #[serde(default)]
    order: Order,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Members {
    pub members: Vec<Member>,
    pub member_count: usize,
}

/// Sorts in place. "Descending" by role means most senior first.
pub(crate) fn sort_members(members: &mut [Member], sort_by: SortBy, order: Order) {
    match sort_by {
        SortBy::Trophies => members.sort_by_key(|m| Reverse(m.trophies)),
        SortBy::Donations => members.sort_by_key(|m| Reverse(m.donations)),
        SortBy::Role => members.sort_by_key(|m| m.role_rank()),
    }
    if order == Order::Asc {
        members.reverse();
    }
}

#[instrument(skip(api))]
pub(crate) async fn members(
    Path(tag): Path<String>,
    query: Result<Query<MembersQuery>, axum::extract::rejection::QueryRejection>,
    State(api): State<Api>,
) -> ProxyResult<Members> {
    let Query(query) = query.map_err(|_| {
        ProxyError::bad_request(
            "sort_by must be one of trophies, donations, role and order one of desc, asc",
        )
    })?;
    let tag = Tag::parse(&tag)?;
    let clan = api
        .get_clan(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "clan members"))?;

    let mut members = clan.member_list;
    sort_members(&mut members, query.sort_by, query.order);
    Ok(Envelope::ok(Members {
        member_count: members.len(),
        members,
    }))
}

#[instrument(skip(api))]
pub(crate) async fn war_log(Path(tag): Path<String>, State(api): State<Api>) -> ProxyResult<WarLog> {
    let tag = Tag::parse(&tag)?;
    let log = api
        .get_clan_war_log(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "war log"))?;
    Ok(Envelope::ok(log))
}

#[instrument(skip(api))]
pub(crate) async fn current_war(
    Path(tag): Path<String>,
    State(api): State<Api>,
) -> ProxyResult<CurrentWar> {
    let tag = Tag::parse(&tag)?;
    let war = api
        .get_clan_current_war(&tag)
        .await
        .map_err(|e| ProxyError::upstream(e, "current war"))?;
    Ok(Envelope::ok(war))
}
