use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use simplenotes::data::{Note, NoteId, NotePatch};

use crate::client_constants::NOTES_ENDPOINT;

mod errors;

pub use errors::ClientError;

/// The notes endpoints as seen from a client.
#[async_trait]
pub trait NotesApi: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Note>, ClientError>;

    async fn create(&self, patch: &NotePatch) -> Result<Note, ClientError>;

    async fn update(
        &self,
        id: &NoteId,
        patch: &NotePatch,
    ) -> Result<Note, ClientError>;

    async fn delete(&self, id: &NoteId) -> Result<(), ClientError>;
}

#[derive(Debug)]
pub struct HttpNotesApi {
    client: Client,
    notes_url: Url,
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorAnswer {
    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

impl HttpNotesApi {
    /// `base_url` is the API root the `notes` collection hangs off,
    /// e.g. `https://example.com/api/`.
    pub fn new(
        base_url: &str,
        token: Option<String>,
    ) -> Result<HttpNotesApi, ClientError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let notes_url = base.join(NOTES_ENDPOINT)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(HttpNotesApi {
            client: Client::new(),
            notes_url,
            token,
        })
    }

    fn note_url(&self, id: &NoteId) -> Result<Url, ClientError> {
        let mut url = self.notes_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.notes_url.to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    let answer: ErrorAnswer = serde_json::from_slice(&body).unwrap_or_default();
    debug!("request failed with status {status}");
    Err(ClientError::Status {
        status,
        message: answer.error.or(answer.message),
    })
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> Result<Vec<Note>, ClientError> {
        trace!("fetching notes");
        let response = self.authorize(self.client.get(self.notes_url.clone()))
            .send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, patch: &NotePatch) -> Result<Note, ClientError> {
        trace!("creating a note");
        let response = self.authorize(self.client.post(self.notes_url.clone()))
            .json(patch)
            .send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(
        &self,
        id: &NoteId,
        patch: &NotePatch,
    ) -> Result<Note, ClientError> {
        trace!("updating note {id}");
        let response = self.authorize(self.client.put(self.note_url(id)?))
            .json(patch)
            .send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete(&self, id: &NoteId) -> Result<(), ClientError> {
        trace!("deleting note {id}");
        let response = self.authorize(self.client.delete(self.note_url(id)?))
            .send().await?;
        check_status(response).await?;
        Ok(())
    }
}
