use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::Mutex;
use assert_fs::TempDir;
use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use time::macros::datetime;
use crate::data::UserId;
use crate::storage::StorageError;
use crate::storage::file::FileBackend;
use crate::storage::key_value::KeyValueBackend;
use crate::storage::key_value::store::MemoryKeyValueStore;
use super::*;

const START: OffsetDateTime = datetime!(2024-02-18 12:30:00 UTC);

/// Hands out scripted ids first, then `generated-N`; the clock only moves
/// when told to.
struct TestRepositoryIo {
    ids: Mutex<VecDeque<&'static str>>,
    counter: Mutex<usize>,
    now: Mutex<OffsetDateTime>,
}

impl TestRepositoryIo {
    fn new() -> Self {
        Self::with_ids([] as [&'static str; 0])
    }

    fn with_ids(ids: impl IntoIterator<Item = &'static str>) -> Self {
        TestRepositoryIo {
            ids: Mutex::new(ids.into_iter().collect()),
            counter: Mutex::new(0),
            now: Mutex::new(START),
        }
    }
}

impl NoteRepositoryIo for TestRepositoryIo {
    fn generate_id(&self) -> NoteId {
        if let Some(id) = self.ids.lock().unwrap().pop_front() {
            return NoteId::from_str(id).unwrap();
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        NoteId::from_str(&format!("generated-{counter}")).unwrap()
    }

    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

type TestRepository = NoteRepositoryImpl<TestRepositoryIo>;

fn memory_repository(io: TestRepositoryIo) -> TestRepository {
    NoteRepositoryImpl::new_internal(
        Box::new(KeyValueBackend::new(MemoryKeyValueStore::new())),
        io,
    )
}

fn set_now(repository: &TestRepository, now: OffsetDateTime) {
    *repository.io.now.lock().unwrap() = now;
}

fn user(id: &str) -> Scope {
    Scope::User(UserId::from_str(id).unwrap())
}

struct BrokenBackend;

#[async_trait]
impl NoteBackend for BrokenBackend {
    async fn read_all(&self, _: &Scope) -> Result<Vec<Note>, StorageError> {
        Err(StorageError::Backend("broken".into()))
    }

    async fn read_one(
        &self,
        _: &Scope,
        _: &NoteId,
    ) -> Result<Option<Note>, StorageError> {
        Err(StorageError::Backend("broken".into()))
    }

    async fn write_one(&self, _: &Scope, _: &Note) -> Result<(), StorageError> {
        Err(StorageError::Backend("broken".into()))
    }

    async fn replace_one(&self, _: &Scope, _: &Note) -> Result<bool, StorageError> {
        Err(StorageError::Backend("broken".into()))
    }

    async fn delete_one(&self, _: &Scope, _: &NoteId) -> Result<bool, StorageError> {
        Err(StorageError::Backend("broken".into()))
    }

    fn preserves_insertion_order(&self) -> bool {
        true
    }
}

/// Deletes every note right after it has been read, like a DELETE request
/// landing in the middle of an update.
struct DeletingAfterReadBackend(Box<dyn NoteBackend>);

#[async_trait]
impl NoteBackend for DeletingAfterReadBackend {
    async fn read_all(&self, scope: &Scope) -> Result<Vec<Note>, StorageError> {
        self.0.read_all(scope).await
    }

    async fn read_one(
        &self,
        scope: &Scope,
        id: &NoteId,
    ) -> Result<Option<Note>, StorageError> {
        let note = self.0.read_one(scope, id).await?;
        self.0.delete_one(scope, id).await?;
        Ok(note)
    }

    async fn write_one(&self, scope: &Scope, note: &Note) -> Result<(), StorageError> {
        self.0.write_one(scope, note).await
    }

    async fn replace_one(&self, scope: &Scope, note: &Note) -> Result<bool, StorageError> {
        self.0.replace_one(scope, note).await
    }

    async fn delete_one(&self, scope: &Scope, id: &NoteId) -> Result<bool, StorageError> {
        self.0.delete_one(scope, id).await
    }

    fn preserves_insertion_order(&self) -> bool {
        self.0.preserves_insertion_order()
    }
}

async fn assert_update_does_not_resurrect(inner: Box<dyn NoteBackend>) {
    let note = Note {
        id: NoteId::from_str("n1").unwrap(),
        content: "a".into(),
        created_at: START,
        updated_at: START,
    };
    inner.write_one(&Scope::Global, &note).await.unwrap();
    let repository = NoteRepositoryImpl::new_internal(
        Box::new(DeletingAfterReadBackend(inner)),
        TestRepositoryIo::new(),
    );

    let err = repository
        .update(&Scope::Global, &note.id, NotePatch::with_content("b"))
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::NotFound), "wrong error type: {err:#?}");
    assert!(repository.list_all(&Scope::Global).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_racing_delete_keeps_note_deleted_in_memory() {
    assert_update_does_not_resurrect(
        Box::new(KeyValueBackend::new(MemoryKeyValueStore::new())),
    ).await;
}

#[tokio::test]
async fn update_racing_delete_keeps_note_deleted_in_files() {
    let dir = TempDir::new().unwrap();
    assert_update_does_not_resurrect(
        Box::new(FileBackend::new(dir.path().to_owned())),
    ).await;
}

#[tokio::test]
async fn empty_scope_lists_nothing() {
    let repository = memory_repository(TestRepositoryIo::new());
    assert!(repository.list_all(&Scope::Global).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_without_content_is_empty() {
    let repository = memory_repository(TestRepositoryIo::new());
    let note = repository.create(&Scope::Global, NotePatch::default())
        .await.unwrap();
    assert_eq!(note.content, "");
    assert_eq!(note.created_at, START);
    assert_eq!(note.updated_at, START);
    assert!(!note.id.is_empty());
}

#[tokio::test]
async fn created_ids_are_unique() {
    let repository = memory_repository(TestRepositoryIo::new());
    let mut ids = HashSet::new();
    for _ in 0..10 {
        let note = repository.create(&Scope::Global, NotePatch::default())
            .await.unwrap();
        assert!(ids.insert(note.id));
    }
    assert_eq!(repository.list_all(&Scope::Global).await.unwrap().len(), 10);
}

#[tokio::test]
async fn create_skips_taken_ids() {
    let repository = memory_repository(TestRepositoryIo::with_ids(["a", "a", "b"]));
    let first = repository.create(&Scope::Global, NotePatch::with_content("1"))
        .await.unwrap();
    let second = repository.create(&Scope::Global, NotePatch::with_content("2"))
        .await.unwrap();
    assert_eq!(&*first.id, "a");
    assert_eq!(&*second.id, "b");
}

#[tokio::test]
async fn create_gives_up_on_a_stuck_generator() {
    let repository = memory_repository(
        TestRepositoryIo::with_ids(["a", "a", "a", "a", "a"]),
    );
    repository.create(&Scope::Global, NotePatch::default()).await.unwrap();
    let err = repository.create(&Scope::Global, NotePatch::default())
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::IdExhausted), "wrong error type: {err:#?}");
    assert_eq!(repository.list_all(&Scope::Global).await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_then_update_lists_latest_content() {
    let repository = memory_repository(TestRepositoryIo::new());
    let created = repository.create(&Scope::Global, NotePatch::with_content("hello"))
        .await.unwrap();
    set_now(&repository, START + Duration::minutes(1));
    let updated = repository
        .update(&Scope::Global, &created.id, NotePatch::with_content("world"))
        .await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, START + Duration::minutes(1));

    let notes = repository.list_all(&Scope::Global).await.unwrap();
    assert_eq!(notes, [updated]);
    assert_eq!(notes[0].content, "world");
}

#[tokio::test]
async fn update_without_content_keeps_it() {
    let repository = memory_repository(TestRepositoryIo::new());
    let created = repository.create(&Scope::Global, NotePatch::with_content("keep"))
        .await.unwrap();
    let updated = repository
        .update(&Scope::Global, &created.id, NotePatch::default())
        .await.unwrap();
    assert_eq!(updated.content, "keep");
}

#[tokio::test]
async fn update_never_moves_updated_at_backwards() {
    let repository = memory_repository(TestRepositoryIo::new());
    let created = repository.create(&Scope::Global, NotePatch::default())
        .await.unwrap();
    set_now(&repository, START - Duration::hours(1));
    let updated = repository
        .update(&Scope::Global, &created.id, NotePatch::with_content("x"))
        .await.unwrap();
    assert_eq!(updated.updated_at, START);
    assert!(updated.updated_at >= updated.created_at);
}

#[tokio::test]
async fn update_missing_note_does_not_create() {
    let repository = memory_repository(TestRepositoryIo::new());
    let err = repository
        .update(
            &Scope::Global,
            &NoteId::from_str("nope").unwrap(),
            NotePatch::with_content("x"),
        )
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::NotFound), "wrong error type: {err:#?}");
    assert!(repository.list_all(&Scope::Global).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_twice_fails_the_second_time() {
    let repository = memory_repository(TestRepositoryIo::new());
    let created = repository.create(&Scope::Global, NotePatch::default())
        .await.unwrap();
    repository.delete(&Scope::Global, &created.id).await.unwrap();
    assert!(repository.list_all(&Scope::Global).await.unwrap().is_empty());
    let err = repository.delete(&Scope::Global, &created.id)
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::NotFound), "wrong error type: {err:#?}");
}

#[tokio::test]
async fn users_never_see_each_other() {
    let repository = memory_repository(TestRepositoryIo::new());
    let alices = repository.create(&user("alice"), NotePatch::with_content("mine"))
        .await.unwrap();

    assert!(repository.list_all(&user("bob")).await.unwrap().is_empty());
    let err = repository
        .update(&user("bob"), &alices.id, NotePatch::with_content("stolen"))
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::NotFound), "wrong error type: {err:#?}");
    let err = repository.delete(&user("bob"), &alices.id)
        .await.expect_err("should fail");
    assert!(matches!(err, RepositoryError::NotFound), "wrong error type: {err:#?}");

    assert_eq!(
        repository.list_all(&user("alice")).await.unwrap()[0].content,
        "mine",
    );
}

#[tokio::test]
async fn unordered_backend_lists_latest_first() {
    let repository = memory_repository(TestRepositoryIo::new());
    let mut ids = Vec::new();
    for minute in 0..5 {
        set_now(&repository, START + Duration::minutes(minute));
        ids.push(
            repository.create(&Scope::Global, NotePatch::default())
                .await.unwrap().id
        );
    }
    set_now(&repository, START + Duration::minutes(10));
    repository.update(&Scope::Global, &ids[1], NotePatch::with_content("x"))
        .await.unwrap();

    let listed: Vec<NoteId> = repository.list_all(&Scope::Global).await.unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(
        listed,
        [1, 4, 3, 2, 0].map(|i| ids[i].clone()),
    );
}

#[tokio::test]
async fn file_backend_keeps_creation_order() {
    let dir = TempDir::new().unwrap();
    let repository = NoteRepositoryImpl::new_internal(
        Box::new(FileBackend::new(dir.path().to_owned())),
        TestRepositoryIo::new(),
    );
    let first = repository.create(&Scope::Global, NotePatch::default())
        .await.unwrap();
    let second = repository.create(&Scope::Global, NotePatch::default())
        .await.unwrap();
    set_now(&repository, START + Duration::minutes(10));
    repository.update(&Scope::Global, &second.id, NotePatch::with_content("x"))
        .await.unwrap();

    let listed: Vec<NoteId> = repository.list_all(&Scope::Global).await.unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(listed, [first.id, second.id]);
}

#[tokio::test]
async fn storage_errors_propagate() {
    let repository = NoteRepositoryImpl::new_internal(
        Box::new(BrokenBackend),
        TestRepositoryIo::new(),
    );
    let id = NoteId::from_str("1").unwrap();
    assert!(matches!(
        repository.list_all(&Scope::Global).await,
        Err(RepositoryError::Storage(_)),
    ));
    assert!(matches!(
        repository.create(&Scope::Global, NotePatch::default()).await,
        Err(RepositoryError::Storage(_)),
    ));
    assert!(matches!(
        repository.update(&Scope::Global, &id, NotePatch::default()).await,
        Err(RepositoryError::Storage(_)),
    ));
    assert!(matches!(
        repository.delete(&Scope::Global, &id).await,
        Err(RepositoryError::Storage(_)),
    ));
}
