use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::mongodb::Id;
use crate::model::poll::PollStatus;
use crate::model::principal::Principal;
use crate::store::PollStore;

/// Tally for a single choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceTally {
    pub choice: String,
    pub votes: u64,
    pub percentage: f64,
}

/// Full results of an ended poll, choices in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResults {
    pub poll: String,
    pub status: PollStatus,
    pub total_votes: u64,
    pub results: Vec<ChoiceTally>,
}

/// Aggregate votes per choice once a poll has ended.
///
/// Results open strictly after `end_time`, one instant later than the voting
/// cutoff: at exactly `end_time` a poll is neither votable nor viewable.
/// Only the poll's creator or an admin may see results.
pub async fn compute_results(
    store: &dyn PollStore,
    principal: &Principal,
    poll_id: Id,
    now: DateTime<Utc>,
) -> Result<PollResults> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;

    if poll.is_draft {
        return Err(Error::PollNotPublished);
    }
    let end = poll.end_time.ok_or(Error::InvalidWindow)?;
    if now <= end {
        return Err(Error::ResultsNotYetAvailable);
    }
    if !principal.is_admin && principal.user_id != poll.creator_id {
        return Err(Error::Unauthorized(
            "You are not authorized to view results for this poll".to_string(),
        ));
    }

    let votes = store.votes_for_poll(poll_id).await?;
    let total_votes = votes.len() as u64;
    let results = poll
        .choices
        .iter()
        .map(|choice| {
            let count = votes.iter().filter(|vote| vote.choice_id == choice.id).count() as u64;
            ChoiceTally {
                choice: choice.text.clone(),
                votes: count,
                percentage: percentage(count, total_votes),
            }
        })
        .collect();

    Ok(PollResults {
        poll: poll.question.clone(),
        status: poll.status(now),
        total_votes,
        results,
    })
}

/// Share of the total as a percentage, rounded to two decimal places.
/// Zero when there are no votes at all.
fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = votes as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}
