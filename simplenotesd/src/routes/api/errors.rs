use log::error;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{catch, catchers, Catcher, Request};
use serde::Serialize;
use simplenotes::repository::RepositoryError;

pub const FETCH_FAILED: &str = "Failed to fetch notes";
pub const CREATE_FAILED: &str = "Failed to create note";
pub const UPDATE_FAILED: &str = "Failed to update note";
pub const DELETE_FAILED: &str = "Failed to delete note";
pub const NOTE_NOT_FOUND: &str = "Note not found";
pub const UNAUTHORIZED: &str = "Unauthorized";
pub const INVALID_REQUEST: &str = "Invalid request";
pub const NOT_FOUND: &str = "Not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Failures a handler answers with. Only the generic message reaches the
/// client, the details are logged where the error is mapped.
#[derive(Debug, Eq, PartialEq)]
pub enum ApiError {
    NoteNotFound,
    InvalidRequest,
    Internal(&'static str),
}

impl ApiError {
    pub fn from_repository(
        err: RepositoryError,
        failure_message: &'static str,
    ) -> ApiError {
        match err {
            RepositoryError::NotFound => ApiError::NoteNotFound,
            e => {
                error!("{failure_message}: {e}");
                ApiError::Internal(failure_message)
            },
        }
    }

    fn status_and_message(&self) -> (Status, &'static str) {
        match self {
            ApiError::NoteNotFound => (Status::NotFound, NOTE_NOT_FOUND),
            ApiError::InvalidRequest => (Status::BadRequest, INVALID_REQUEST),
            ApiError::Internal(message) => (Status::InternalServerError, *message),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).respond_to(request)
    }
}

#[catch(400)]
fn bad_request() -> (Status, Json<ErrorBody>) {
    (Status::BadRequest, Json(ErrorBody { error: INVALID_REQUEST }))
}

#[catch(401)]
fn unauthorized() -> (Status, Json<ErrorBody>) {
    (Status::Unauthorized, Json(ErrorBody { error: UNAUTHORIZED }))
}

#[catch(404)]
fn not_found() -> (Status, Json<ErrorBody>) {
    (Status::NotFound, Json(ErrorBody { error: NOT_FOUND }))
}

#[catch(500)]
fn internal_error() -> (Status, Json<ErrorBody>) {
    (Status::InternalServerError, Json(ErrorBody { error: INTERNAL_ERROR }))
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request) -> (Status, Json<ErrorBody>) {
    (status, Json(ErrorBody { error: status.reason().unwrap_or(INTERNAL_ERROR) }))
}

pub fn api_catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        unauthorized,
        not_found,
        internal_error,
        default_catcher,
    ]
}
