use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};
use crate::model::mongodb::Id;
use crate::model::poll::{Choice, Poll, PollCore};
use crate::model::principal::Principal;
use crate::store::PollStore;

use super::ensure_creator_or_admin;

/// Voting window length applied when an immediate publish leaves the end
/// time unset.
const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Caller-supplied fields for creating or editing a poll.
#[derive(Debug, Clone)]
pub struct PollSpec {
    pub question: String,
    pub choices: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// If false, the poll is published as part of creation.
    pub is_draft: bool,
}

impl PollSpec {
    /// Shared validation for create and edit.
    fn validate(&self) -> Result<()> {
        if self.choices.len() < 2 {
            return Err(Error::InsufficientChoices);
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                return Err(Error::InvalidWindow);
            }
        }
        Ok(())
    }

    /// Turn the spec into storable poll data, always as a draft.
    fn into_core(self, creator_id: Id, created_at: DateTime<Utc>) -> PollCore {
        PollCore {
            creator_id,
            question: self.question,
            start_time: self.start_time,
            end_time: self.end_time,
            is_draft: true,
            published_at: None,
            created_at,
            choices: self
                .choices
                .into_iter()
                .map(|text| Choice { id: Id::new(), text })
                .collect(),
        }
    }
}

/// Create a poll.
///
/// An immediate-publish request (`is_draft == false`) defaults any missing
/// window bound (`start = now`, `end = now + 5 minutes`), then runs a
/// two-phase create: insert as a draft so the choices are attached under a
/// valid ID, then publish. All validation happens before the insert, so a
/// failing create writes nothing, and the poll is never observable as
/// published while half-constructed.
pub async fn create_poll(
    store: &dyn PollStore,
    principal: &Principal,
    mut spec: PollSpec,
    now: DateTime<Utc>,
) -> Result<Poll> {
    let publish_now = !spec.is_draft;
    if publish_now {
        spec.start_time = Some(spec.start_time.unwrap_or(now));
        spec.end_time = Some(
            spec.end_time
                .unwrap_or(now + Duration::minutes(DEFAULT_WINDOW_MINUTES)),
        );
    }
    spec.validate()?;

    let poll = store
        .insert_poll(spec.into_core(principal.user_id, now))
        .await?;

    if publish_now {
        // The window and choices were validated above, and nobody else knows
        // this ID yet, so the conditional update cannot lose.
        let published = store.publish_poll(poll.id, now).await?;
        return published.ok_or(Error::AlreadyPublished);
    }
    Ok(poll)
}

/// Publish a draft poll, fixing its voting window and opening it to votes.
/// This is the only mutating transition and it never reverts.
pub async fn publish_poll(
    store: &dyn PollStore,
    principal: &Principal,
    poll_id: Id,
    now: DateTime<Utc>,
) -> Result<Poll> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    ensure_creator_or_admin(principal, &poll)?;

    if !poll.is_draft {
        return Err(Error::AlreadyPublished);
    }
    if poll.choices.len() < 2 {
        return Err(Error::InsufficientChoices);
    }
    let (start, end) = match (poll.start_time, poll.end_time) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(Error::MissingWindow),
    };
    if start >= end {
        return Err(Error::InvalidWindow);
    }

    // The conditional update is what makes a concurrent double publish lose
    // deterministically; the draft check above only shapes the error.
    store
        .publish_poll(poll_id, now)
        .await?
        .ok_or(Error::AlreadyPublished)
}

/// Replace a draft poll's question, window, and choices.
/// Published polls are immutable.
pub async fn update_poll(
    store: &dyn PollStore,
    principal: &Principal,
    poll_id: Id,
    spec: PollSpec,
) -> Result<Poll> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    ensure_creator_or_admin(principal, &poll)?;
    if !poll.is_draft {
        return Err(Error::AlreadyPublished);
    }
    spec.validate()?;

    let core = spec.into_core(poll.creator_id, poll.created_at);
    store
        .replace_draft(poll_id, core)
        .await?
        .ok_or(Error::AlreadyPublished)
}

/// Delete a draft poll, cascading to its choices and votes.
pub async fn delete_poll(store: &dyn PollStore, principal: &Principal, poll_id: Id) -> Result<()> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    ensure_creator_or_admin(principal, &poll)?;
    if !poll.is_draft {
        return Err(Error::AlreadyPublished);
    }

    if !store.delete_poll(poll_id).await? {
        return Err(Error::not_found(format!("Poll {poll_id}")));
    }
    Ok(())
}
