use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::{option_datetime_as_bson_datetime, Id};

/// Core poll data, as stored in the database.
///
/// While `is_draft` is true the voting window may be unset; publishing
/// requires both bounds with `start_time < end_time` and stamps
/// `published_at` exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollCore {
    /// The user who created this poll.
    pub creator_id: Id,
    /// The question being asked.
    pub question: String,
    /// Start of the voting window (inclusive).
    #[serde(default, with = "option_datetime_as_bson_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    /// End of the voting window (exclusive).
    #[serde(default, with = "option_datetime_as_bson_datetime")]
    pub end_time: Option<DateTime<Utc>>,
    /// Whether this poll is still an unpublished draft.
    pub is_draft: bool,
    /// When the draft→published transition happened, if it has.
    #[serde(default, with = "option_datetime_as_bson_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Choices in insertion order. They live and die with the poll.
    pub choices: Vec<Choice>,
}

impl PollCore {
    /// The poll's current status, derived from its fields and the given time.
    /// Never stored.
    pub fn status(&self, now: DateTime<Utc>) -> PollStatus {
        if self.is_draft {
            return PollStatus::Draft;
        }
        let (start, end) = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (start, end),
            _ => return PollStatus::Invalid,
        };
        if now < start {
            PollStatus::Scheduled
        } else if now < end {
            PollStatus::Active
        } else {
            PollStatus::Ended
        }
    }

    /// True iff the poll is published and `now` is within the voting window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == PollStatus::Active
    }

    /// Look up one of this poll's choices.
    pub fn choice(&self, choice_id: Id) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }
}

/// A poll as read from the database, with its ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub poll: PollCore,
}

impl Deref for Poll {
    type Target = PollCore;

    fn deref(&self) -> &Self::Target {
        &self.poll
    }
}

/// A choice belonging to a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: Id,
    pub text: String,
}

/// States in the poll lifecycle. The voting window is half-open:
/// `status(start_time)` is already `Active`, `status(end_time)` is `Ended`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollStatus {
    /// Under construction, not votable.
    Draft,
    /// Published without a complete voting window. Should not normally occur.
    Invalid,
    /// Published, voting has not opened yet.
    Scheduled,
    /// Published, inside the voting window.
    Active,
    /// Published, voting has closed.
    Ended,
}
