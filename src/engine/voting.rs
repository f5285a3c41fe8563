use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::mongodb::Id;
use crate::model::principal::Principal;
use crate::model::vote::{Vote, VoteCore};
use crate::store::PollStore;

/// Cast a vote on a poll.
///
/// The voting window is half-open: a vote at exactly `start_time` is
/// accepted, a vote at exactly `end_time` is rejected. The existing-vote
/// pre-check only shapes the error for the common case; under a concurrent
/// race the storage uniqueness constraint picks the loser, whose insert
/// comes back as [`Error::AlreadyVoted`].
pub async fn cast_vote(
    store: &dyn PollStore,
    principal: &Principal,
    poll_id: Id,
    choice_id: Id,
    now: DateTime<Utc>,
) -> Result<Vote> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;

    if poll.is_draft {
        return Err(Error::PollNotPublished);
    }
    let (start, end) = match (poll.start_time, poll.end_time) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(Error::InvalidWindow),
    };
    if now < start {
        return Err(Error::NotYetOpen);
    }
    if now >= end {
        return Err(Error::Closed);
    }
    if store.vote(principal.user_id, poll_id).await?.is_some() {
        return Err(Error::AlreadyVoted);
    }
    if poll.choice(choice_id).is_none() {
        return Err(Error::ChoiceNotInPoll);
    }

    let vote = store
        .insert_vote(VoteCore {
            user_id: principal.user_id,
            poll_id,
            choice_id,
            voted_at: now,
        })
        .await?;
    Ok(vote)
}
