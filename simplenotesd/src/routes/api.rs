use std::str::FromStr;
use log::debug;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, routes, Route, State};
use simplenotes::data::{Note, NoteId};
use simplenotes::repository::NoteRepository;

use crate::app_constants::NOTES_PATH;
use authentication_guard::CallerScope;
use errors::{ApiError, CREATE_FAILED, DELETE_FAILED, FETCH_FAILED, UPDATE_FAILED};
use model::{MessageBody, PatchBody};

pub mod authentication_guard;
pub mod errors;
pub mod model;
#[cfg(test)] mod tests;

const NOTE_DELETED: &str = "Note deleted successfully";

#[get("/notes")]
async fn list_notes(
    scope: CallerScope,
    repository: &State<NoteRepository>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = repository
        .list_all(&scope.0)
        .await
        .map_err(|e| ApiError::from_repository(e, FETCH_FAILED))?;
    Ok(Json(notes))
}

#[post("/notes", data = "<patch>")]
async fn create_note(
    scope: CallerScope,
    repository: &State<NoteRepository>,
    patch: PatchBody,
) -> Result<Created<Json<Note>>, ApiError> {
    let note = repository
        .create(&scope.0, patch.0)
        .await
        .map_err(|e| ApiError::from_repository(e, CREATE_FAILED))?;
    Ok(
        Created::new(format!("{NOTES_PATH}/{}", note.id))
            .body(Json(note))
    )
}

#[put("/notes/<id>", data = "<patch>")]
async fn update_note(
    scope: CallerScope,
    repository: &State<NoteRepository>,
    id: &str,
    patch: PatchBody,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(id)?;
    let note = repository
        .update(&scope.0, &id, patch.0)
        .await
        .map_err(|e| ApiError::from_repository(e, UPDATE_FAILED))?;
    Ok(Json(note))
}

#[delete("/notes/<id>")]
async fn delete_note(
    scope: CallerScope,
    repository: &State<NoteRepository>,
    id: &str,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_note_id(id)?;
    repository
        .delete(&scope.0, &id)
        .await
        .map_err(|e| ApiError::from_repository(e, DELETE_FAILED))?;
    Ok(Json(MessageBody { message: NOTE_DELETED }))
}

#[put("/notes")]
fn update_note_without_id(_scope: CallerScope) -> ApiError {
    ApiError::InvalidRequest
}

#[delete("/notes")]
fn delete_note_without_id(_scope: CallerScope) -> ApiError {
    ApiError::InvalidRequest
}

fn parse_note_id(id: &str) -> Result<NoteId, ApiError> {
    NoteId::from_str(id)
        .map_err(|e| {
            debug!("rejected note id \"{id}\": {e}");
            ApiError::InvalidRequest
        })
}

pub fn api_routes() -> Vec<Route> {
    routes![
        list_notes,
        create_note,
        update_note,
        delete_note,
        update_note_without_id,
        delete_note_without_id,
    ]
}
