//! The core operations: poll lifecycle transitions, vote casting, and
//! results aggregation. Handlers pass in the current time, so everything
//! here is deterministic under test.

pub mod lifecycle;
pub mod results;
pub mod voting;

use crate::error::{Error, Result};
use crate::model::poll::Poll;
use crate::model::principal::Principal;

/// Object-level gate: only the poll's creator or an admin may proceed.
pub fn ensure_creator_or_admin(principal: &Principal, poll: &Poll) -> Result<()> {
    if principal.is_admin || principal.user_id == poll.creator_id {
        Ok(())
    } else {
        Err(Error::Unauthorized(
            "You are not the creator of this poll".to_string(),
        ))
    }
}
