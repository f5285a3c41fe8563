use rocket::Route;

mod polls;
mod votes;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(polls::routes());
    routes.extend(votes::routes());
    routes
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{Cookie, Status},
        local::asynchronous::Client,
        serde::json::{json, serde_json, Value},
    };

    use crate::model::mongodb::Id;
    use crate::model::principal::{Principal, PRINCIPAL_COOKIE};
    use crate::store::{MemoryPollStore, PollStore};

    /// A fixed key so private cookies can be minted in tests.
    const SECRET_KEY: &str = "hPRYyVRiMyxpw5sBB1XeCMN1kFsDCqKvBi2QJxBVHQk=";

    /// A client against the full route set, backed by the in-memory store.
    async fn client() -> Client {
        let figment = rocket::Config::figment().merge(("secret_key", SECRET_KEY));
        let store: Box<dyn PollStore> = Box::new(MemoryPollStore::new());
        let rocket = rocket::custom(figment)
            .mount("/", super::routes())
            .manage(store);
        Client::tracked(rocket)
            .await
            .expect("valid rocket instance")
    }

    fn principal_cookie(principal: &Principal) -> Cookie<'static> {
        Cookie::new(
            PRINCIPAL_COOKIE,
            serde_json::to_string(principal).unwrap(),
        )
    }

    #[rocket::async_test]
    async fn anonymous_requests_are_rejected() {
        let client = client().await;

        let response = client.get("/polls").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .post("/polls")
            .json(&json!({"question": "Q?", "choices": "A, B"}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .post("/votes")
            .json(&json!({"poll": Id::new().to_hex(), "choice": Id::new().to_hex()}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn undecodable_principal_cookies_are_rejected() {
        let client = client().await;

        // A plaintext cookie never decrypts as a private one.
        let response = client
            .get("/polls")
            .cookie(Cookie::new(PRINCIPAL_COOKIE, "{}"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        // A properly encrypted cookie that does not hold a principal.
        let response = client
            .get("/polls")
            .private_cookie(Cookie::new(PRINCIPAL_COOKIE, "not a principal"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn poll_routes_cover_the_draft_lifecycle() {
        let client = client().await;
        let creator = Principal::user(Id::new());

        // Create a draft; choices arrive comma-separated.
        let response = client
            .post("/polls")
            .private_cookie(principal_cookie(&creator))
            .json(&json!({
                "question": "Tea or coffee?",
                "choices": "Tea, Coffee",
                "is_draft": true,
            }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let poll = response.into_json::<Value>().await.unwrap();
        assert_eq!(poll["status"], "Draft");
        assert_eq!(poll["choices"], "Tea, Coffee");
        assert_eq!(poll["choice_list"].as_array().unwrap().len(), 2);
        let poll_id = poll["id"].as_str().unwrap().to_string();

        // Give it a window, then publish.
        let response = client
            .put(format!("/polls/{poll_id}"))
            .private_cookie(principal_cookie(&creator))
            .json(&json!({
                "question": "Tea or coffee?",
                "choices": "Tea, Coffee",
                "start_time": "2030-01-01T12:00:00Z",
                "end_time": "2030-01-01T13:00:00Z",
                "is_draft": true,
            }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post(format!("/polls/{poll_id}/publish"))
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let poll = response.into_json::<Value>().await.unwrap();
        assert_eq!(poll["is_draft"], false);
        assert_eq!(poll["status"], "Scheduled");

        // Visible in the listing and by ID.
        let response = client
            .get("/polls")
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let polls = response.into_json::<Value>().await.unwrap();
        assert_eq!(polls.as_array().unwrap().len(), 1);

        let response = client
            .get(format!("/polls/{poll_id}"))
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let poll = response.into_json::<Value>().await.unwrap();
        assert_eq!(poll["question"], "Tea or coffee?");
    }

    #[rocket::async_test]
    async fn vote_routes_record_and_list_only_own_votes() {
        let client = client().await;
        let creator = Principal::user(Id::new());
        let voter = Principal::user(Id::new());

        // An immediately published poll is open right away.
        let response = client
            .post("/polls")
            .private_cookie(principal_cookie(&creator))
            .json(&json!({
                "question": "Tabs or spaces?",
                "choices": "Tabs, Spaces",
                "is_draft": false,
            }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let poll = response.into_json::<Value>().await.unwrap();
        assert_eq!(poll["status"], "Active");
        let poll_id = poll["id"].as_str().unwrap().to_string();
        let choice_id = poll["choice_list"][0]["id"].as_str().unwrap().to_string();

        let response = client
            .post("/votes")
            .private_cookie(principal_cookie(&voter))
            .json(&json!({"poll": poll_id, "choice": choice_id}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let vote = response.into_json::<Value>().await.unwrap();
        assert_eq!(vote["poll"], poll_id);
        assert_eq!(vote["choice"], choice_id);

        // A second vote by the same user conflicts.
        let response = client
            .post("/votes")
            .private_cookie(principal_cookie(&voter))
            .json(&json!({"poll": poll_id, "choice": choice_id}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Conflict);

        // The voter sees their vote; the creator has none.
        let response = client
            .get("/votes")
            .private_cookie(principal_cookie(&voter))
            .dispatch()
            .await;
        let votes = response.into_json::<Value>().await.unwrap();
        assert_eq!(votes.as_array().unwrap().len(), 1);

        let response = client
            .get("/votes")
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        let votes = response.into_json::<Value>().await.unwrap();
        assert!(votes.as_array().unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn rejected_requests_carry_the_error_kind() {
        let client = client().await;
        let creator = Principal::user(Id::new());

        let response = client
            .post("/polls")
            .private_cookie(principal_cookie(&creator))
            .json(&json!({"question": "Q?", "choices": "only one"}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!(body["error"], "InsufficientChoices");

        let response = client
            .get(format!("/polls/{}", Id::new().to_hex()))
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!(body["error"], "NotFound");

        // Results of a still-open poll are unavailable.
        let response = client
            .post("/polls")
            .private_cookie(principal_cookie(&creator))
            .json(&json!({
                "question": "Q?",
                "choices": "A, B",
                "is_draft": false,
            }))
            .dispatch()
            .await;
        let poll = response.into_json::<Value>().await.unwrap();
        let poll_id = poll["id"].as_str().unwrap().to_string();

        let response = client
            .get(format!("/polls/{poll_id}/results"))
            .private_cookie(principal_cookie(&creator))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
        let body = response.into_json::<Value>().await.unwrap();
        assert_eq!(body["error"], "ResultsNotYetAvailable");
    }
}
