use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::model::mongodb::Id;
use crate::model::poll::{Poll, PollCore};
use crate::model::vote::{Vote, VoteCore};

use super::{PollStore, StoreError, StoreResult};

/// An in-memory store. The single mutex serialises every operation, which
/// stands in for the per-entity atomicity the MongoDB store gets from the
/// server, so the engine behaves identically under concurrent callers.
#[derive(Debug, Default)]
pub struct MemoryPollStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    polls: Vec<Poll>,
    votes: Vec<Vote>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl PollStore for MemoryPollStore {
    async fn insert_poll(&self, poll: PollCore) -> StoreResult<Poll> {
        let poll = Poll {
            id: Id::new(),
            poll,
        };
        self.inner.lock().unwrap().polls.push(poll.clone());
        Ok(poll)
    }

    async fn poll(&self, id: Id) -> StoreResult<Option<Poll>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.polls.iter().find(|poll| poll.id == id).cloned())
    }

    async fn polls(&self) -> StoreResult<Vec<Poll>> {
        let mut polls = self.inner.lock().unwrap().polls.clone();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(polls)
    }

    async fn replace_draft(&self, id: Id, poll: PollCore) -> StoreResult<Option<Poll>> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .polls
            .iter_mut()
            .find(|existing| existing.id == id && existing.is_draft);
        Ok(existing.map(|existing| {
            existing.poll = poll;
            existing.clone()
        }))
    }

    async fn publish_poll(&self, id: Id, at: DateTime<Utc>) -> StoreResult<Option<Poll>> {
        let mut inner = self.inner.lock().unwrap();
        let draft = inner
            .polls
            .iter_mut()
            .find(|poll| poll.id == id && poll.is_draft);
        Ok(draft.map(|poll| {
            poll.poll.is_draft = false;
            poll.poll.published_at = Some(at);
            poll.clone()
        }))
    }

    async fn delete_poll(&self, id: Id) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.polls.len();
        inner.polls.retain(|poll| poll.id != id);
        let deleted = inner.polls.len() < before;
        if deleted {
            // Cascade, as the transactional delete does in MongoDB.
            inner.votes.retain(|vote| vote.poll_id != id);
        }
        Ok(deleted)
    }

    async fn insert_vote(&self, vote: VoteCore) -> StoreResult<Vote> {
        let mut inner = self.inner.lock().unwrap();
        // Check-and-insert under one lock: this is the uniqueness constraint.
        let duplicate = inner
            .votes
            .iter()
            .any(|existing| existing.poll_id == vote.poll_id && existing.user_id == vote.user_id);
        if duplicate {
            return Err(StoreError::Duplicate);
        }
        let vote = Vote {
            id: Id::new(),
            vote,
        };
        inner.votes.push(vote.clone());
        Ok(vote)
    }

    async fn vote(&self, user_id: Id, poll_id: Id) -> StoreResult<Option<Vote>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .votes
            .iter()
            .find(|vote| vote.user_id == user_id && vote.poll_id == poll_id)
            .cloned())
    }

    async fn votes_for_poll(&self, poll_id: Id) -> StoreResult<Vec<Vote>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .votes
            .iter()
            .filter(|vote| vote.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn votes_by_user(&self, user_id: Id) -> StoreResult<Vec<Vote>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .votes
            .iter()
            .filter(|vote| vote.user_id == user_id)
            .cloned()
            .collect())
    }
}
