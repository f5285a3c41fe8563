//! API-facing representations. These never hit the database, so timestamps
//! serialise as plain chrono datetimes and IDs as hex strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::poll::{Poll, PollStatus};
use crate::model::vote::Vote;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub id: String,
    pub text: String,
}

/// A poll as returned to callers, with its derived status fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollView {
    pub id: String,
    pub question: String,
    pub creator: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_draft: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Comma-joined choice text, mirroring the creation input format.
    pub choices: String,
    pub choice_list: Vec<ChoiceView>,
    pub status: PollStatus,
    pub is_active: bool,
}

impl PollView {
    pub fn new(poll: &Poll, now: DateTime<Utc>) -> Self {
        Self {
            id: poll.id.to_hex(),
            question: poll.question.clone(),
            creator: poll.creator_id.to_hex(),
            start_time: poll.start_time,
            end_time: poll.end_time,
            is_draft: poll.is_draft,
            published_at: poll.published_at,
            created_at: poll.created_at,
            choices: poll
                .choices
                .iter()
                .map(|choice| choice.text.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            choice_list: poll
                .choices
                .iter()
                .map(|choice| ChoiceView {
                    id: choice.id.to_hex(),
                    text: choice.text.clone(),
                })
                .collect(),
            status: poll.status(now),
            is_active: poll.is_active(now),
        }
    }
}

/// A vote as returned to the caller who cast it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteView {
    pub id: String,
    pub user: String,
    pub poll: String,
    pub choice: String,
    pub voted_at: DateTime<Utc>,
}

impl VoteView {
    pub fn new(vote: &Vote) -> Self {
        Self {
            id: vote.id.to_hex(),
            user: vote.user_id.to_hex(),
            poll: vote.poll_id.to_hex(),
            choice: vote.choice_id.to_hex(),
            voted_at: vote.voted_at,
        }
    }
}
