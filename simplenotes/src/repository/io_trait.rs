use time::OffsetDateTime;
use crate::data::NoteId;
use crate::rng::make_uuid;
use crate::util::now_millis;

pub trait NoteRepositoryIo: Send + Sync {
    fn generate_id(&self) -> NoteId;

    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default)]
pub struct ProductionNoteRepositoryIo;

impl ProductionNoteRepositoryIo {
    pub fn new() -> Self {
        ProductionNoteRepositoryIo
    }
}

impl NoteRepositoryIo for ProductionNoteRepositoryIo {
    fn generate_id(&self) -> NoteId {
        make_uuid(&mut rand::rng()).into()
    }

    fn now(&self) -> OffsetDateTime {
        now_millis()
    }
}
