use std::io::Cursor;

use rocket::{
    http::{ContentType, Status},
    response::{self, Responder},
    Request, Response,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while handling a request.
///
/// All variants except `Db` and `Jwt` are recoverable, user-facing
/// conditions; they carry the message shown to the UI and never crash the
/// process.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Admin's departments do not alias onto the scope they tried to manage.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// Missing required field, bad date, malformed request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Phase ordering violated (e.g. opening an election before filing closed).
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Filing closed: {0}")]
    FilingClosed(String),
    #[error("Voting closed: {0}")]
    VotingClosed(String),
    /// Student's home department does not alias onto the scope.
    #[error("Ineligible: {0}")]
    Ineligible(String),
    #[error("Incomplete ballot: {0}")]
    IncompleteBallot(String),
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),
    #[error("Duplicate vote: {0}")]
    DuplicateVote(String),
    #[error("Duplicate application: {0}")]
    DuplicateApplication(String),
}

impl Error {
    fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Jwt(_) => Status::InternalServerError,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Forbidden(_) | Self::Ineligible(_) => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::InvalidInput(_) => Status::BadRequest,
            Self::InvalidTransition(_)
            | Self::FilingClosed(_)
            | Self::VotingClosed(_)
            | Self::IncompleteBallot(_)
            | Self::InvalidChoice(_) => Status::UnprocessableEntity,
            Self::DuplicateVote(_) | Self::DuplicateApplication(_) => Status::Conflict,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    /// Surface the error as a status plus a JSON `{"error": ...}` body.
    /// Internal errors are logged in full but reported opaquely.
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = match &self {
            Self::Db(_) | Self::Jwt(_) => {
                error!("{self}");
                "internal error".to_string()
            }
            _ => {
                warn!("{self}");
                self.to_string()
            }
        };
        let body = format!("{{\"error\":{}}}", rocket::serde::json::json!(message));
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            Error::Forbidden("x".into()).status(),
            Status::Forbidden
        );
        assert_eq!(Error::Ineligible("x".into()).status(), Status::Forbidden);
        assert_eq!(Error::NotFound("x".into()).status(), Status::NotFound);
        assert_eq!(Error::InvalidInput("x".into()).status(), Status::BadRequest);
        assert_eq!(
            Error::InvalidTransition("x".into()).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            Error::IncompleteBallot("x".into()).status(),
            Status::UnprocessableEntity
        );
        assert_eq!(
            Error::DuplicateVote("x".into()).status(),
            Status::Conflict
        );
        assert_eq!(
            Error::Unauthorized("x".into()).status(),
            Status::Unauthorized
        );
    }
}
