use chrono::Utc;
use rocket::{serde::json::Json, Route, State};
use serde::Deserialize;

use crate::engine::voting;
use crate::error::Result;
use crate::model::mongodb::Id;
use crate::model::principal::Principal;
use crate::model::view::VoteView;
use crate::store::PollStore;

pub fn routes() -> Vec<Route> {
    routes![cast_vote, get_votes]
}

/// A vote the caller wishes to cast.
#[derive(Debug, Deserialize)]
struct VoteRequest {
    poll: String,
    choice: String,
}

#[post("/votes", data = "<request>", format = "json")]
async fn cast_vote(
    principal: Principal,
    request: Json<VoteRequest>,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<VoteView>> {
    let poll_id: Id = request.poll.parse()?;
    let choice_id: Id = request.choice.parse()?;
    let vote = voting::cast_vote(
        store.inner().as_ref(),
        &principal,
        poll_id,
        choice_id,
        Utc::now(),
    )
    .await?;
    Ok(Json(VoteView::new(&vote)))
}

/// The calling user's own votes.
#[get("/votes")]
async fn get_votes(
    principal: Principal,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<Vec<VoteView>>> {
    let votes = store.votes_by_user(principal.user_id).await?;
    Ok(Json(votes.iter().map(VoteView::new).collect()))
}
