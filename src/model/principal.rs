use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
    serde::json::serde_json,
};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Name of the private cookie carrying the authenticated principal.
/// The external identity layer sets it; we only read it back.
pub const PRINCIPAL_COOKIE: &str = "principal";

/// The authenticated caller: a stable user ID plus an admin flag.
/// Anonymous access is never permitted, so every endpoint takes this guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Id,
    pub is_admin: bool,
}

impl Principal {
    pub fn user(user_id: Id) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: Id) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Principal {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let principal = req
            .cookies()
            .get_private(PRINCIPAL_COOKIE)
            .and_then(|cookie| serde_json::from_str::<Principal>(cookie.value()).ok());
        match principal {
            Some(principal) => request::Outcome::Success(principal),
            None => request::Outcome::Failure((Status::Unauthorized, ())),
        }
    }
}
