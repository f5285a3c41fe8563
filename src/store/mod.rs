//! The persistence seam. The engine only ever talks to a [`PollStore`];
//! the MongoDB implementation backs the server and the in-memory one backs
//! the unit tests.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::mongodb::Id;
use crate::model::poll::{Poll, PollCore};
use crate::model::vote::{Vote, VoteCore};

mod memory;
mod mongo;

pub use memory::MemoryPollStore;
pub use mongo::MongoPollStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a [`PollStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
}

impl From<StoreError> for crate::error::Error {
    fn from(err: StoreError) -> Self {
        match err {
            // The only uniqueness constraint in the store is the
            // one-vote-per-user-per-poll index.
            StoreError::Duplicate => crate::error::Error::AlreadyVoted,
            StoreError::Db(err) => crate::error::Error::Db(err),
        }
    }
}

/// Durable storage for polls and votes.
///
/// Implementations must make the conditional updates (`publish_poll`,
/// `replace_draft`) and the constrained `insert_vote` atomic: under
/// concurrent invocation for the same entity, exactly one caller wins and
/// the rest observe the losing outcome. Check-then-insert sequences in the
/// engine are never the authoritative guard.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// Insert a new poll and return it with its assigned ID.
    async fn insert_poll(&self, poll: PollCore) -> StoreResult<Poll>;

    async fn poll(&self, id: Id) -> StoreResult<Option<Poll>>;

    /// All polls, newest first.
    async fn polls(&self) -> StoreResult<Vec<Poll>>;

    /// Replace a poll's data, but only while it is still a draft.
    /// Returns `None` if it does not exist or is already published.
    async fn replace_draft(&self, id: Id, poll: PollCore) -> StoreResult<Option<Poll>>;

    /// Atomically flip a draft to published, stamping `published_at = at`.
    /// Returns `None` if no draft with this ID exists; a concurrent second
    /// publish therefore deterministically loses.
    async fn publish_poll(&self, id: Id, at: DateTime<Utc>) -> StoreResult<Option<Poll>>;

    /// Delete a poll together with all of its votes, atomically.
    /// Returns false if the poll did not exist.
    async fn delete_poll(&self, id: Id) -> StoreResult<bool>;

    /// Insert a vote, failing with [`StoreError::Duplicate`] if this user has
    /// already voted on this poll.
    async fn insert_vote(&self, vote: VoteCore) -> StoreResult<Vote>;

    async fn vote(&self, user_id: Id, poll_id: Id) -> StoreResult<Option<Vote>>;

    async fn votes_for_poll(&self, poll_id: Id) -> StoreResult<Vec<Vote>>;

    async fn votes_by_user(&self, user_id: Id) -> StoreResult<Vec<Vote>>;
}
