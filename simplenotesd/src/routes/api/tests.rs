use rand::SeedableRng;
use rand::rngs::StdRng;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::{Client, LocalResponse};
use rocket::{Build, Rocket};
use serde_json::{json, Value};
use simplenotes::data::UserId;
use simplenotes::identity::{AccessTokenGenerator, AccessTokenIdentityProvider, AccessTokenKey};
use simplenotes::storage::key_value::KeyValueBackend;
use simplenotes::storage::key_value::store::MemoryKeyValueStore;
use time::{Duration, OffsetDateTime};
use crate::routes::{ApiRocketBuildExt, ScopeResolver};
use super::*;

fn rocket_with(scope_resolver: ScopeResolver) -> Rocket<Build> {
    rocket::build()
        .manage(
            NoteRepository::new(
                Box::new(KeyValueBackend::new(MemoryKeyValueStore::new()))
            )
        )
        .manage(scope_resolver)
        .install_simplenotes_api()
}

async fn global_client() -> Client {
    Client::tracked(rocket_with(ScopeResolver::Global)).await.unwrap()
}

fn test_key() -> AccessTokenKey {
    AccessTokenKey::generate(&mut StdRng::seed_from_u64(7))
}

async fn per_user_client() -> Client {
    Client::tracked(
        rocket_with(
            ScopeResolver::PerUser(
                Box::new(AccessTokenIdentityProvider::new(&test_key()))
            )
        )
    ).await.unwrap()
}

fn bearer_for(user: &str) -> Header<'static> {
    let now = OffsetDateTime::now_utc();
    let token = AccessTokenGenerator::new(&test_key())
        .generate_token(
            &user.parse::<UserId>().unwrap(),
            now - Duration::minutes(1),
            now + Duration::minutes(15),
        )
        .unwrap();
    Header::new("Authorization", format!("Bearer {token}"))
}

async fn json_body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.expect("json body")
}

#[rocket::async_test]
async fn empty_list() {
    let client = global_client().await;
    let response = client.get("/api/notes").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::JSON));
    assert_eq!(json_body(response).await, json!([]));
}

#[rocket::async_test]
async fn create_returns_created_note() {
    let client = global_client().await;
    let response = client.post("/api/notes")
        .header(ContentType::JSON)
        .body(r#"{"content": "hello", "id": "ignored"}"#)
        .dispatch().await;
    assert_eq!(response.status(), Status::Created);
    let location = response.headers().get_one("Location").unwrap().to_owned();
    let note = json_body(response).await;
    assert_eq!(note["content"], "hello");
    assert_ne!(note["id"], "ignored");
    assert_eq!(note["createdAt"], note["updatedAt"]);
    assert_eq!(location, format!("/api/notes/{}", note["id"].as_str().unwrap()));
}

#[rocket::async_test]
async fn create_with_empty_body_has_empty_content() {
    let client = global_client().await;
    let response = client.post("/api/notes").dispatch().await;
    assert_eq!(response.status(), Status::Created);
    assert_eq!(json_body(response).await["content"], "");
}

#[rocket::async_test]
async fn create_with_malformed_body_fails() {
    let client = global_client().await;
    let response = client.post("/api/notes")
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_body(response).await, json!({"error": "Invalid request"}));

    let response = client.get("/api/notes").dispatch().await;
    assert_eq!(json_body(response).await, json!([]));
}

#[rocket::async_test]
async fn update_then_list() {
    let client = global_client().await;
    let created = json_body(
        client.post("/api/notes").body(r#"{"content": "hello"}"#).dispatch().await
    ).await;
    let id = created["id"].as_str().unwrap();

    let response = client.put(format!("/api/notes/{id}"))
        .body(r#"{"content": "world", "createdAt": "1970-01-01T00:00:00Z"}"#)
        .dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let updated = json_body(response).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["content"], "world");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let listed = json_body(client.get("/api/notes").dispatch().await).await;
    assert_eq!(listed, json!([updated]));
}

#[rocket::async_test]
async fn update_missing_note_is_not_found() {
    let client = global_client().await;
    let response = client.put("/api/notes/nope")
        .body(r#"{"content": "x"}"#)
        .dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_body(response).await, json!({"error": "Note not found"}));
}

#[rocket::async_test]
async fn missing_or_blank_id_is_invalid() {
    let client = global_client().await;
    let response = client.put("/api/notes").body("{}").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_body(response).await, json!({"error": "Invalid request"}));

    let response = client.delete("/api/notes").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.delete("/api/notes/%20%20").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn delete_twice() {
    let client = global_client().await;
    let created = json_body(client.post("/api/notes").dispatch().await).await;
    let id = created["id"].as_str().unwrap();

    let response = client.delete(format!("/api/notes/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Note deleted successfully"}),
    );

    let response = client.delete(format!("/api/notes/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_body(response).await, json!({"error": "Note not found"}));
}

#[rocket::async_test]
async fn anonymous_caller_is_rejected() {
    let client = per_user_client().await;
    for response in [
        client.get("/api/notes").dispatch().await,
        client.post("/api/notes").body("{}").dispatch().await,
        client.put("/api/notes/1").body("{}").dispatch().await,
        client.delete("/api/notes/1").dispatch().await,
        client.put("/api/notes").dispatch().await,
    ] {
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(json_body(response).await, json!({"error": "Unauthorized"}));
    }
}

#[rocket::async_test]
async fn unauthorized_wins_over_malformed_body() {
    let client = per_user_client().await;
    let response = client.post("/api/notes")
        .header(Header::new("Authorization", "Bearer garbage"))
        .body("{not json")
        .dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn users_are_isolated() {
    let client = per_user_client().await;
    let alices = json_body(
        client.post("/api/notes")
            .header(bearer_for("alice"))
            .body(r#"{"content": "secret"}"#)
            .dispatch().await
    ).await;
    let id = alices["id"].as_str().unwrap();

    let bobs_list = json_body(
        client.get("/api/notes").header(bearer_for("bob")).dispatch().await
    ).await;
    assert_eq!(bobs_list, json!([]));

    let response = client.put(format!("/api/notes/{id}"))
        .header(bearer_for("bob"))
        .body(r#"{"content": "stolen"}"#)
        .dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client.delete(format!("/api/notes/{id}"))
        .header(bearer_for("bob"))
        .dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let alices_list = json_body(
        client.get("/api/notes").header(bearer_for("alice")).dispatch().await
    ).await;
    assert_eq!(alices_list, json!([alices]));
}

#[rocket::async_test]
async fn unknown_route_answers_json() {
    let client = global_client().await;
    let response = client.get("/api/unknown").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_body(response).await, json!({"error": "Not found"}));
}
