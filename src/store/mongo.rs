use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Database,
};
use rocket::futures::TryStreamExt;

use crate::model::mongodb::{errors::is_duplicate_key_error, Coll, Id};
use crate::model::poll::{Poll, PollCore};
use crate::model::vote::{Vote, VoteCore};

use super::{PollStore, StoreError, StoreResult};

/// The production store, backed by MongoDB.
///
/// Single-document writes give us the atomic conditional updates; the unique
/// `(poll_id, user_id)` index gives us the vote constraint; cascade delete
/// runs in a multi-document transaction.
pub struct MongoPollStore {
    client: Client,
    polls: Coll<Poll>,
    new_polls: Coll<PollCore>,
    votes: Coll<Vote>,
    new_votes: Coll<VoteCore>,
}

impl MongoPollStore {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            polls: Coll::from_db(db),
            new_polls: Coll::from_db(db),
            votes: Coll::from_db(db),
            new_votes: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl PollStore for MongoPollStore {
    async fn insert_poll(&self, poll: PollCore) -> StoreResult<Poll> {
        let new_id: Id = self
            .new_polls
            .insert_one(&poll, None)
            .await?
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB.
            .into();
        debug!("Inserted poll {new_id}");

        // Read back the full poll so the caller sees exactly what was stored.
        let poll = self
            .polls
            .find_one(new_id.as_doc(), None)
            .await?
            .unwrap(); // Just inserted.
        Ok(poll)
    }

    async fn poll(&self, id: Id) -> StoreResult<Option<Poll>> {
        Ok(self.polls.find_one(id.as_doc(), None).await?)
    }

    async fn polls(&self) -> StoreResult<Vec<Poll>> {
        let newest_first = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();
        let polls = self
            .polls
            .find(None, newest_first)
            .await?
            .try_collect()
            .await?;
        Ok(polls)
    }

    async fn replace_draft(&self, id: Id, poll: PollCore) -> StoreResult<Option<Poll>> {
        let filter = doc! {
            "_id": *id,
            "is_draft": true,
        };
        let replaced = self
            .new_polls
            .find_one_and_replace(filter, &poll, None)
            .await?;
        if replaced.is_none() {
            return Ok(None);
        }
        Ok(self.polls.find_one(id.as_doc(), None).await?)
    }

    async fn publish_poll(&self, id: Id, at: DateTime<Utc>) -> StoreResult<Option<Poll>> {
        // The `is_draft` condition makes this a one-way transition: of two
        // concurrent publishes, exactly one matches the draft document.
        let filter = doc! {
            "_id": *id,
            "is_draft": true,
        };
        let update = doc! {
            "$set": {
                "is_draft": false,
                "published_at": BsonDateTime::from_chrono(at),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .polls
            .find_one_and_update(filter, update, options)
            .await?)
    }

    async fn delete_poll(&self, id: Id) -> StoreResult<bool> {
        // Atomically delete the poll and all associated votes. Choices are
        // embedded in the poll document and go with it.
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let result = self
            .polls
            .delete_one_with_session(id.as_doc(), None, &mut session)
            .await?;
        self.votes
            .delete_many_with_session(doc! { "poll_id": *id }, None, &mut session)
            .await?;

        session.commit_transaction().await?;
        Ok(result.deleted_count == 1)
    }

    async fn insert_vote(&self, vote: VoteCore) -> StoreResult<Vote> {
        let new_id: Id = match self.new_votes.insert_one(&vote, None).await {
            Ok(result) => result
                .inserted_id
                .as_object_id()
                .unwrap() // Valid because the ID comes directly from the DB.
                .into(),
            // The loser of a concurrent double vote ends up here.
            Err(err) if is_duplicate_key_error(&err) => return Err(StoreError::Duplicate),
            Err(err) => return Err(err.into()),
        };

        let vote = self
            .votes
            .find_one(new_id.as_doc(), None)
            .await?
            .unwrap(); // Just inserted.
        Ok(vote)
    }

    async fn vote(&self, user_id: Id, poll_id: Id) -> StoreResult<Option<Vote>> {
        let filter = doc! {
            "user_id": *user_id,
            "poll_id": *poll_id,
        };
        Ok(self.votes.find_one(filter, None).await?)
    }

    async fn votes_for_poll(&self, poll_id: Id) -> StoreResult<Vec<Vote>> {
        let votes = self
            .votes
            .find(doc! { "poll_id": *poll_id }, None)
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }

    async fn votes_by_user(&self, user_id: Id) -> StoreResult<Vec<Vote>> {
        let votes = self
            .votes
            .find(doc! { "user_id": *user_id }, None)
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }
}
