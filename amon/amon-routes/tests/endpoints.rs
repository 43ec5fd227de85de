use amon_routes::routes;
use amon_routes::state::AmonAppState;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use repositories::memory::InMemoryStore;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const ENTITIES: &str = "/amon/entities";
const METERING_POINTS: &str = "/amon/metering-points";

const ENTITY_ID: &str = "6f0f5c5e-1b57-4c5a-9a3a-2f1d1c6d8e21";
const OTHER_ENTITY_ID: &str = "2c4d6e8f-0a1b-4c3d-8e5f-6a7b8c9d0e1f";
const METERING_POINT_ID: &str = "0b8e6c9a-4f7e-4b7e-9a59-3f0d1c2b4a11";

#[fixture]
fn server() -> TestServer {
    let state = AmonAppState::new_without_metrics(InMemoryStore::new().into_engine());
    TestServer::new(routes::build(state)).expect("creation of test server")
}

fn entity_path(id: &str) -> String {
    format!("{ENTITIES}/{id}")
}

fn metering_point_path(id: &str) -> String {
    format!("{METERING_POINTS}/{id}")
}

fn location(response: &TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .expect("location is ascii")
        .to_owned()
}

fn message(response: &TestResponse) -> String {
    response.json::<Value>()["message"]
        .as_str()
        .expect("error body carries a message")
        .to_owned()
}

async fn create_entity(server: &TestServer, id: &str) {
    server
        .post(ENTITIES)
        .json(&json!({ "entityId": id }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn create_metering_point(server: &TestServer, id: &str, entity_id: &str) {
    server
        .post(METERING_POINTS)
        .json(&json!({ "meteringPointId": id, "entityId": entity_id }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[rstest]
#[tokio::test]
async fn listing_without_entities_is_empty(server: TestServer) {
    let response = server.get(ENTITIES).await;

    response.assert_status_ok();
    response.assert_json(&json!({ "entities": [] }));
}

#[rstest]
#[tokio::test]
async fn created_entity_can_be_fetched_from_its_location(server: TestServer) {
    let created = server
        .post(ENTITIES)
        .json(&json!({ "description": "lobby sensor" }))
        .await;

    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["entityId"]
        .as_str()
        .expect("generated id")
        .to_owned();
    assert_eq!(entity_path(&id), location(&created));

    let fetched = server.get(&location(&created)).await;

    fetched.assert_status_ok();
    fetched.assert_json(&json!({
        "entities": [{
            "entityId": id,
            "description": "lobby sensor",
            "meteringPointIds": [],
        }]
    }));
}

#[rstest]
#[tokio::test]
async fn explicit_entity_id_is_normalized(server: TestServer) {
    let created = server
        .post(ENTITIES)
        .json(&json!({ "entityId": ENTITY_ID.to_uppercase() }))
        .await;

    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "entityId": ENTITY_ID }));
    assert_eq!(entity_path(ENTITY_ID), location(&created));
}

#[rstest]
#[tokio::test]
async fn entity_lookup_accepts_any_case(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;

    let response = server.get(&entity_path(&ENTITY_ID.to_uppercase())).await;

    response.assert_status_ok();
}

#[rstest]
#[tokio::test]
async fn listing_shows_entity_summaries(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    create_metering_point(&server, METERING_POINT_ID, ENTITY_ID).await;

    let response = server.get(ENTITIES).await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "entities": [{ "entityId": ENTITY_ID, "description": null }]
    }));
}

#[rstest]
#[tokio::test]
async fn duplicate_entity_is_forbidden_and_first_is_kept(server: TestServer) {
    server
        .post(ENTITIES)
        .json(&json!({ "entityId": ENTITY_ID, "description": "first" }))
        .await
        .assert_status(StatusCode::CREATED);

    let duplicate = server
        .post(ENTITIES)
        .json(&json!({ "entityId": ENTITY_ID, "description": "second" }))
        .await;

    duplicate.assert_status(StatusCode::FORBIDDEN);
    duplicate.assert_json(&json!({ "message": "The entity already exists" }));

    let kept = server.get(&entity_path(ENTITY_ID)).await.json::<Value>();
    assert_eq!("first", kept["entities"][0]["description"]);
}

#[rstest]
#[case::too_short("6f0f5c5e-1b57-4c5a-9a3a")]
#[case::wrong_grouping("6f0f5c5e1b57-4c5a-9a3a-2f1d-1c6d8e21")]
#[case::not_hex("6f0f5c5e-1b57-4c5a-9a3a-2f1d1c6d8ezz")]
#[tokio::test]
async fn malformed_entity_id_on_create_is_bad_request(
    server: TestServer,
    #[case] id: &str,
) {
    let response = server.post(ENTITIES).json(&json!({ "entityId": id })).await;

    response.assert_status_bad_request();
    assert!(message(&response).starts_with("Invalid entity parameters: "));
}

#[rstest]
#[tokio::test]
async fn unknown_entity_is_not_found(server: TestServer) {
    let response = server.get(&entity_path(ENTITY_ID)).await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "message": "Entity not found" }));
}

#[rstest]
#[tokio::test]
async fn malformed_entity_id_in_path_is_bad_request(server: TestServer) {
    let get = server.get(&entity_path("bad-id")).await;
    let put = server
        .put(&entity_path("bad-id"))
        .json(&json!({ "description": "x" }))
        .await;
    let delete = server.delete(&entity_path("bad-id")).await;

    get.assert_status_bad_request();
    put.assert_status_bad_request();
    delete.assert_status_bad_request();
}

#[rstest]
#[tokio::test]
async fn entity_upsert_creates_then_updates(server: TestServer) {
    let created = server
        .put(&entity_path(ENTITY_ID))
        .json(&json!({ "description": "hall" }))
        .await;

    created.assert_status(StatusCode::CREATED);
    assert_eq!(entity_path(ENTITY_ID), location(&created));

    let updated = server
        .put(&entity_path(ENTITY_ID))
        .json(&json!({ "description": "kitchen" }))
        .await;

    updated.assert_status(StatusCode::NO_CONTENT);
    let stored = server.get(&entity_path(ENTITY_ID)).await.json::<Value>();
    assert_eq!("kitchen", stored["entities"][0]["description"]);
}

#[rstest]
#[tokio::test]
async fn entity_upsert_keeps_metering_points(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    create_metering_point(&server, METERING_POINT_ID, ENTITY_ID).await;

    server
        .put(&entity_path(ENTITY_ID))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server.get(&entity_path(ENTITY_ID)).await.assert_json(&json!({
        "entities": [{
            "entityId": ENTITY_ID,
            "description": null,
            "meteringPointIds": [METERING_POINT_ID],
        }]
    }));
}

#[rstest]
#[tokio::test]
async fn deleting_entity_removes_its_metering_points(server: TestServer) {
    const SECOND_METERING_POINT_ID: &str = "9d3a1c7e-5b2f-4e8a-b6c4-1f0e2d3c4b5a";
    create_entity(&server, ENTITY_ID).await;
    create_metering_point(&server, METERING_POINT_ID, ENTITY_ID).await;
    create_metering_point(&server, SECOND_METERING_POINT_ID, ENTITY_ID).await;

    let deleted = server.delete(&entity_path(ENTITY_ID)).await;

    deleted.assert_status(StatusCode::NO_CONTENT);
    server
        .get(&entity_path(ENTITY_ID))
        .await
        .assert_status_not_found();
    server
        .get(&metering_point_path(METERING_POINT_ID))
        .await
        .assert_status_not_found();
    server
        .get(&metering_point_path(SECOND_METERING_POINT_ID))
        .await
        .assert_status_not_found();
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_entity_is_not_found(server: TestServer) {
    let response = server.delete(&entity_path(ENTITY_ID)).await;

    response.assert_status_not_found();
    response.assert_json(&json!({ "message": "Entity not found" }));
}

#[rstest]
#[tokio::test]
async fn non_json_payload_is_unsupported(server: TestServer) {
    let text = server.post(ENTITIES).text("description=lobby").await;
    let no_content_type = server.post(ENTITIES).await;

    text.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    no_content_type.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[rstest]
#[tokio::test]
async fn empty_json_body_is_bad_request(server: TestServer) {
    let response = server
        .put(&entity_path(ENTITY_ID))
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "message": "request body is empty" }));
}

#[rstest]
#[case::not_json(b"{\"description\": ")]
#[case::wrong_shape(b"{\"description\": 5}")]
#[tokio::test]
async fn malformed_json_body_is_bad_request(server: TestServer, #[case] body: &'static [u8]) {
    let response = server
        .post(ENTITIES)
        .bytes(Bytes::from_static(body))
        .content_type("application/json")
        .await;

    response.assert_status_bad_request();
    assert!(message(&response).starts_with("failed to parse request body"));
}

#[rstest]
#[tokio::test]
async fn created_metering_point_can_be_fetched_from_its_location(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;

    let created = server
        .post(METERING_POINTS)
        .json(&json!({
            "meteringPointId": METERING_POINT_ID,
            "entityId": ENTITY_ID,
            "description": "boiler",
            "metadata": { "x": 1.5, "y": 2.0 },
        }))
        .await;

    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "meteringPointId": METERING_POINT_ID }));
    assert_eq!(metering_point_path(METERING_POINT_ID), location(&created));

    let fetched = server.get(&location(&created)).await;

    fetched.assert_status_ok();
    fetched.assert_json(&json!({
        "meteringPoints": [{
            "meteringPointId": METERING_POINT_ID,
            "entityId": ENTITY_ID,
            "description": "boiler",
            "metadata": { "x": 1.5, "y": 2.0, "z": null },
        }]
    }));
}

#[rstest]
#[tokio::test]
async fn metering_point_create_requires_both_ids(server: TestServer) {
    let no_id = server
        .post(METERING_POINTS)
        .json(&json!({ "entityId": ENTITY_ID }))
        .await;
    let no_entity = server
        .post(METERING_POINTS)
        .json(&json!({ "meteringPointId": METERING_POINT_ID }))
        .await;

    no_id.assert_status_bad_request();
    no_id.assert_json(&json!({
        "message": "Invalid metering point parameters: meteringPointId is required"
    }));
    no_entity.assert_status_bad_request();
    no_entity.assert_json(&json!({
        "message": "Invalid metering point parameters: entityId is required"
    }));
}

#[rstest]
#[tokio::test]
async fn metering_point_under_unknown_entity_is_bad_request(server: TestServer) {
    let response = server
        .post(METERING_POINTS)
        .json(&json!({ "meteringPointId": METERING_POINT_ID, "entityId": ENTITY_ID }))
        .await;

    response.assert_status_bad_request();
    server
        .get(&metering_point_path(METERING_POINT_ID))
        .await
        .assert_status_not_found();
}

#[rstest]
#[tokio::test]
async fn duplicate_metering_point_is_forbidden(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    create_metering_point(&server, METERING_POINT_ID, ENTITY_ID).await;

    let duplicate = server
        .post(METERING_POINTS)
        .json(&json!({ "meteringPointId": METERING_POINT_ID, "entityId": ENTITY_ID }))
        .await;

    duplicate.assert_status(StatusCode::FORBIDDEN);
    duplicate.assert_json(&json!({ "message": "The metering point already exists" }));
}

#[rstest]
#[tokio::test]
async fn unknown_and_malformed_metering_point_ids(server: TestServer) {
    let unknown = server.get(&metering_point_path(METERING_POINT_ID)).await;
    let malformed = server.get(&metering_point_path("bad-id")).await;

    unknown.assert_status_not_found();
    unknown.assert_json(&json!({ "message": "Metering Point not found" }));
    malformed.assert_status_bad_request();
}

#[rstest]
#[tokio::test]
async fn metering_point_upsert_reparents_and_keeps_metadata(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    create_entity(&server, OTHER_ENTITY_ID).await;
    server
        .post(METERING_POINTS)
        .json(&json!({
            "meteringPointId": METERING_POINT_ID,
            "entityId": ENTITY_ID,
            "metadata": { "z": 3.0 },
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let moved = server
        .put(&metering_point_path(METERING_POINT_ID))
        .json(&json!({ "entityId": OTHER_ENTITY_ID, "description": "moved" }))
        .await;

    moved.assert_status(StatusCode::NO_CONTENT);
    server
        .get(&metering_point_path(METERING_POINT_ID))
        .await
        .assert_json(&json!({
            "meteringPoints": [{
                "meteringPointId": METERING_POINT_ID,
                "entityId": OTHER_ENTITY_ID,
                "description": "moved",
                "metadata": { "x": null, "y": null, "z": 3.0 },
            }]
        }));
    let previous_parent = server.get(&entity_path(ENTITY_ID)).await.json::<Value>();
    assert_eq!(json!([]), previous_parent["entities"][0]["meteringPointIds"]);
}

#[rstest]
#[tokio::test]
async fn metering_point_upsert_with_null_metadata_clears_it(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    server
        .post(METERING_POINTS)
        .json(&json!({
            "meteringPointId": METERING_POINT_ID,
            "entityId": ENTITY_ID,
            "metadata": { "x": 1.0 },
        }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .put(&metering_point_path(METERING_POINT_ID))
        .json(&json!({ "metadata": null }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stored = server
        .get(&metering_point_path(METERING_POINT_ID))
        .await
        .json::<Value>();
    assert_eq!(
        json!({ "x": null, "y": null, "z": null }),
        stored["meteringPoints"][0]["metadata"]
    );
}

#[rstest]
#[tokio::test]
async fn metering_point_upsert_creates_under_given_entity(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;

    let created = server
        .put(&metering_point_path(METERING_POINT_ID))
        .json(&json!({ "entityId": ENTITY_ID }))
        .await;

    created.assert_status(StatusCode::CREATED);
    assert_eq!(metering_point_path(METERING_POINT_ID), location(&created));
    server
        .get(METERING_POINTS)
        .await
        .assert_json(&json!({
            "meteringPoints": [{
                "meteringPointId": METERING_POINT_ID,
                "entityId": ENTITY_ID,
                "description": null,
                "metadata": { "x": null, "y": null, "z": null },
            }]
        }));
}

#[rstest]
#[tokio::test]
async fn metering_point_upsert_without_entity_cannot_create(server: TestServer) {
    let response = server
        .put(&metering_point_path(METERING_POINT_ID))
        .json(&json!({ "description": "orphan" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({
        "message": "Invalid metering point parameters: entityId is required"
    }));
}

#[rstest]
#[tokio::test]
async fn metering_point_upsert_to_unknown_entity_is_bad_request(server: TestServer) {
    create_entity(&server, ENTITY_ID).await;
    create_metering_point(&server, METERING_POINT_ID, ENTITY_ID).await;

    let response = server
        .put(&metering_point_path(METERING_POINT_ID))
        .json(&json!({ "entityId": OTHER_ENTITY_ID }))
        .await;

    response.assert_status_bad_request();
    let stored = server
        .get(&metering_point_path(METERING_POINT_ID))
        .await
        .json::<Value>();
    assert_eq!(ENTITY_ID, stored["meteringPoints"][0]["entityId"]);
}

#[rstest]
#[tokio::test]
async fn metrics_endpoint_reports_disabled(server: TestServer) {
    let response = server.get("/amon/metrics").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
#[tokio::test]
async fn openapi_document_lists_every_route(server: TestServer) {
    let response = server.get("/amon/api-docs/openapi.json").await;

    response.assert_status_ok();
    let paths = &response.json::<Value>()["paths"];
    for path in [
        "/amon/entities",
        "/amon/entities/{entity_id}",
        "/amon/metering-points",
        "/amon/metering-points/{metering_point_id}",
    ] {
        assert!(paths.get(path).is_some(), "missing {path}");
    }
}
