//! Write authorization for owned records.
//!
//! Reads are never gated. Writes go through [`authorize`], which looks the
//! rule up by [`ResourceKind`] in a single table of plain functions.

use uuid::Uuid;

use crate::{AppError, AppResult, auth::CallerIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Profile,
    Post,
    Comment,
    Like,
}

/// Who owns a record. `parent_owner` is the owner of the post a comment or
/// like hangs off.
#[derive(Debug, Clone, Copy)]
pub struct Ownership {
    pub owner: Uuid,
    pub parent_owner: Option<Uuid>,
}

impl Ownership {
    pub fn owned_by(owner: Uuid) -> Self {
        Self { owner, parent_owner: None }
    }

    pub fn with_parent(owner: Uuid, parent_owner: Uuid) -> Self {
        Self { owner, parent_owner: Some(parent_owner) }
    }
}

type Rule = fn(Uuid, &Ownership) -> bool;

const RULES: [(ResourceKind, Rule); 4] = [
    (ResourceKind::Profile, owner_only),
    (ResourceKind::Post, owner_only),
    (ResourceKind::Comment, owner_or_parent_owner),
    (ResourceKind::Like, owner_only),
];

fn owner_only(caller: Uuid, ownership: &Ownership) -> bool {
    caller == ownership.owner
}

fn owner_or_parent_owner(caller: Uuid, ownership: &Ownership) -> bool {
    caller == ownership.owner || Some(caller) == ownership.parent_owner
}

fn rule(kind: ResourceKind) -> Rule {
    RULES
        .iter()
        .find_map(|&(k, rule)| (k == kind).then_some(rule))
        .unwrap_or(deny)
}

fn deny(_: Uuid, _: &Ownership) -> bool {
    false
}

pub fn can_mutate(caller: Option<&CallerIdentity>, kind: ResourceKind, ownership: &Ownership) -> bool {
    caller.is_some_and(|caller| rule(kind)(caller.profile_id, ownership))
}

/// Like [`can_mutate`], but as the error the caller should see: 401 without
/// a caller, 403 (never 404) for anyone who isn't allowed.
pub fn authorize(caller: Option<&CallerIdentity>, kind: ResourceKind, ownership: &Ownership) -> AppResult<()> {
    if caller.is_none() {
        return Err(AppError::Unauthenticated);
    }

    if can_mutate(caller, kind, ownership) {
        Ok(())
    } else {
        tracing::debug!(?kind, owner = %ownership.owner, "write denied");
        Err(AppError::Forbidden)
    }
}
