use chrono::{DateTime, Utc};
use rocket::{serde::json::Json, Route, State};
use serde::Deserialize;

use crate::engine::lifecycle::{self, PollSpec};
use crate::engine::results::{self, PollResults};
use crate::error::{Error, Result};
use crate::model::mongodb::Id;
use crate::model::principal::Principal;
use crate::model::view::PollView;
use crate::store::PollStore;

pub fn routes() -> Vec<Route> {
    routes![
        get_polls,
        get_poll,
        create_poll,
        update_poll,
        delete_poll,
        publish_poll,
        poll_results,
    ]
}

/// Caller-facing poll payload. Choices arrive as a single comma-separated
/// string, e.g. `"Option A, Option B, Option C"`.
#[derive(Debug, Deserialize)]
struct PollRequest {
    question: String,
    choices: String,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    is_draft: bool,
}

impl PollRequest {
    fn into_spec(self) -> Result<PollSpec> {
        Ok(PollSpec {
            question: self.question,
            choices: parse_choice_texts(&self.choices)?,
            start_time: self.start_time,
            end_time: self.end_time,
            is_draft: self.is_draft,
        })
    }
}

/// Split a comma-separated choices string into individual texts:
/// trim whitespace, drop empty entries, reject fewer than two results.
fn parse_choice_texts(input: &str) -> Result<Vec<String>> {
    let texts: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();
    if texts.len() < 2 {
        return Err(Error::InsufficientChoices);
    }
    Ok(texts)
}

#[get("/polls")]
async fn get_polls(
    _principal: Principal,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<Vec<PollView>>> {
    let now = Utc::now();
    let polls = store.polls().await?;
    Ok(Json(
        polls.iter().map(|poll| PollView::new(poll, now)).collect(),
    ))
}

#[get("/polls/<poll_id>")]
async fn get_poll(
    _principal: Principal,
    poll_id: Id,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<PollView>> {
    let poll = store
        .poll(poll_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    Ok(Json(PollView::new(&poll, Utc::now())))
}

#[post("/polls", data = "<request>", format = "json")]
async fn create_poll(
    principal: Principal,
    request: Json<PollRequest>,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<PollView>> {
    let spec = request.into_inner().into_spec()?;
    let now = Utc::now();
    let poll = lifecycle::create_poll(store.inner().as_ref(), &principal, spec, now).await?;
    Ok(Json(PollView::new(&poll, now)))
}

#[put("/polls/<poll_id>", data = "<request>", format = "json")]
async fn update_poll(
    principal: Principal,
    poll_id: Id,
    request: Json<PollRequest>,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<PollView>> {
    let spec = request.into_inner().into_spec()?;
    let poll = lifecycle::update_poll(store.inner().as_ref(), &principal, poll_id, spec).await?;
    Ok(Json(PollView::new(&poll, Utc::now())))
}

#[delete("/polls/<poll_id>")]
async fn delete_poll(
    principal: Principal,
    poll_id: Id,
    store: &State<Box<dyn PollStore>>,
) -> Result<()> {
    lifecycle::delete_poll(store.inner().as_ref(), &principal, poll_id).await
}

#[post("/polls/<poll_id>/publish")]
async fn publish_poll(
    principal: Principal,
    poll_id: Id,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<PollView>> {
    let now = Utc::now();
    let poll = lifecycle::publish_poll(store.inner().as_ref(), &principal, poll_id, now).await?;
    Ok(Json(PollView::new(&poll, now)))
}

#[get("/polls/<poll_id>/results")]
async fn poll_results(
    principal: Principal,
    poll_id: Id,
    store: &State<Box<dyn PollStore>>,
) -> Result<Json<PollResults>> {
    let results =
        results::compute_results(store.inner().as_ref(), &principal, poll_id, Utc::now()).await?;
    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parsing_trims_and_drops_empties() {
        let texts = parse_choice_texts("Option A, Option B , Option C").unwrap();
        assert_eq!(texts, ["Option A", "Option B", "Option C"]);

        let texts = parse_choice_texts("A,,B,  ,").unwrap();
        assert_eq!(texts, ["A", "B"]);
    }

    #[test]
    fn choice_parsing_rejects_fewer_than_two() {
        assert!(matches!(
            parse_choice_texts("only one"),
            Err(Error::InsufficientChoices)
        ));
        assert!(matches!(
            parse_choice_texts("solo,"),
            Err(Error::InsufficientChoices)
        ));
        assert!(matches!(
            parse_choice_texts(""),
            Err(Error::InsufficientChoices)
        ));
    }
}
