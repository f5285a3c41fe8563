use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::Responder,
    serde::json::{json, Json},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can make a request fail. Every variant is recovered at the
/// boundary of the single operation that produced it; none is process-fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    OidParse(#[from] mongodb::bson::oid::Error),
    #[error("At least two choices are required")]
    InsufficientChoices,
    #[error("This poll has an invalid voting window")]
    InvalidWindow,
    #[error("Start and end time must be set before publishing")]
    MissingWindow,
    #[error("Poll is already published")]
    AlreadyPublished,
    #[error("This poll has not been published")]
    PollNotPublished,
    #[error("This poll is not yet open for voting")]
    NotYetOpen,
    #[error("This poll has ended")]
    Closed,
    #[error("You have already voted on this poll")]
    AlreadyVoted,
    #[error("Choice does not belong to this poll")]
    ChoiceNotInPoll,
    #[error("Poll results are available after the poll ends")]
    ResultsNotYetAvailable,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Stable machine-readable name for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Db(_) => "Db",
            Self::OidParse(_) => "BadId",
            Self::InsufficientChoices => "InsufficientChoices",
            Self::InvalidWindow => "InvalidWindow",
            Self::MissingWindow => "MissingWindow",
            Self::AlreadyPublished => "AlreadyPublished",
            Self::PollNotPublished => "PollNotPublished",
            Self::NotYetOpen => "NotYetOpen",
            Self::Closed => "Closed",
            Self::AlreadyVoted => "AlreadyVoted",
            Self::ChoiceNotInPoll => "ChoiceNotInPoll",
            Self::ResultsNotYetAvailable => "ResultsNotYetAvailable",
            Self::Unauthorized(_) => "Unauthorized",
            Self::NotFound(_) => "NotFound",
        }
    }

    fn status(&self) -> Status {
        match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Unauthorized(_) | Self::ResultsNotYetAvailable => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::AlreadyVoted => Status::Conflict,
            _ => Status::BadRequest,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        let mut response = Json(body).respond_to(req)?;
        response.set_status(status);
        Ok(response)
    }
}
