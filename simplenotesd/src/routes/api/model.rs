use async_trait::async_trait;
use log::debug;
use rocket::data::{FromData, Limits, Outcome};
use rocket::http::Status;
use rocket::{Data, Request};
use serde::Serialize;
use simplenotes::data::NotePatch;
use thiserror::Error;

/// A note patch in the request body. An empty body is an empty patch.
#[derive(Debug)]
pub struct PatchBody(pub NotePatch);

#[derive(Debug, Error)]
pub enum PatchBodyError {
    #[error("request too large")]
    RequestTooLarge,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid note patch: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
impl<'r> FromData<'r> for PatchBody {
    type Error = PatchBodyError;

    async fn from_data(
        req: &'r Request<'_>,
        data: Data<'r>,
    ) -> Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(Limits::JSON);
        let body = match data.open(limit).into_string().await {
            Ok(body) if body.is_complete() => body.into_inner(),
            Ok(_) => return Outcome::Error(
                (Status::PayloadTooLarge, PatchBodyError::RequestTooLarge)
            ),
            Err(e) => return Outcome::Error((Status::BadRequest, e.into())),
        };
        if body.trim().is_empty() {
            return Outcome::Success(PatchBody(NotePatch::default()));
        }
        match serde_json::from_str(&body) {
            Ok(patch) => Outcome::Success(PatchBody(patch)),
            Err(e) => {
                debug!("rejected note patch: {e}");
                Outcome::Error((Status::BadRequest, e.into()))
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}
