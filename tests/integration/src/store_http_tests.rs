//! Entity stores against the HTTP test server

use crate::test_utils::{seed_fleet, TestServer};
use motorpool_core::{Config, ReconcileMode};
use motorpool_domain::{Car, EntityId, Owner, Relation, SortSpec};
use motorpool_store::transport::MERGE_PATCH_JSON;
use motorpool_store::{EntityStores, Method, StoreError};
use serde_json::json;

#[tokio::test]
async fn test_list_sends_hints_and_sorts_locally() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();

    let cars = stores.car.list(Some(SortSpec::desc("price"))).await.unwrap();

    let names: Vec<_> = cars.iter().filter_map(|c| c.name.as_deref()).collect();
    assert_eq!(names, vec!["Civic", "Accord", "Fit"]);

    let sent = server.backend.requests().pop().unwrap();
    assert_eq!(sent.path, "api/cars");
    assert_eq!(sent.query_value("sort"), Some("price,desc"));
    let buster: i64 = sent.query_value("cacheBuster").unwrap().parse().unwrap();
    assert!(buster > 0);
}

#[tokio::test]
async fn test_list_by_relation_path() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();

    let cars = stores.car.list(Some(SortSpec::desc("owner.id"))).await.unwrap();

    let owners: Vec<_> = cars.iter().map(|c| c.owner.map(|o| o.id.value())).collect();
    assert_eq!(owners, vec![Some(2), Some(1), None]);
}

#[tokio::test]
async fn test_crud_round_trip() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();

    let created = stores
        .car
        .create(&Car {
            name: Some("Zoe".to_string()),
            model: Some("R".to_string()),
            price: Some(12.5),
            owner: Some(Relation::new(1)),
            ..Car::default()
        })
        .await
        .unwrap();
    let id = created.id.unwrap();
    assert_eq!(created.owner, Some(Relation::new(1)));

    let state = stores.car.state();
    assert!(state.update_success);
    assert_eq!(state.entities.len(), 4);
    assert_eq!(server.backend.count(Method::Get, "api/cars"), 1);

    let mut replaced = created.clone();
    replaced.price = Some(13.0);
    replaced.owner = None;
    let updated = stores.car.update(&replaced).await.unwrap();
    assert_eq!(updated.owner, None);
    assert_eq!(updated.price, Some(13.0));

    let patched = stores
        .car
        .partial_update(&Car {
            id: Some(id),
            model: Some("R2".to_string()),
            ..Car::default()
        })
        .await
        .unwrap();
    assert_eq!(patched.name.as_deref(), Some("Zoe"));
    assert_eq!(patched.model.as_deref(), Some("R2"));

    let patch = server
        .backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Patch)
        .unwrap();
    assert_eq!(patch.content_type, Some(MERGE_PATCH_JSON));
    assert_eq!(patch.body, Some(json!({ "id": id.value(), "model": "R2" })));

    stores.car.delete(id).await.unwrap();
    let state = stores.car.state();
    assert_eq!(state.entity, Car::default());
    assert_eq!(state.entities.len(), 3);
    assert_eq!(server.backend.count(Method::Get, "api/cars"), 4);
}

#[tokio::test]
async fn test_create_payload_is_cleaned() {
    let server = TestServer::start().await;
    let stores = server.stores();

    stores
        .owner
        .create(&Owner {
            name: Some("Cy".to_string()),
            ..Owner::default()
        })
        .await
        .unwrap();

    let post = server
        .backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post)
        .unwrap();
    assert_eq!(post.body, Some(json!({ "name": "Cy" })));
}

#[tokio::test]
async fn test_not_found_is_recorded() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();
    let civic = stores.car.get(EntityId(3)).await.unwrap();

    let err = stores.car.get(EntityId(99)).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    let state = stores.car.state();
    assert_eq!(state.entity, civic);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Request failed with status code 404: car 99 not found")
    );
}

#[tokio::test]
async fn test_id_mismatch_rejected_by_server() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/cars/3", server.base_url()))
        .json(&json!({ "id": 4, "name": "Civic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], json!("Invalid ID"));

    let response = client
        .post(format!("{}/api/owners", server.base_url()))
        .json(&json!({ "id": 1, "name": "Dup" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let mut config = Config::default_config();
    config.api.base_url = "http://127.0.0.1:9".to_string();
    config.api.timeout_ms = 1_000;
    let stores = EntityStores::from_config(&config).unwrap();

    let err = stores.owner.list(None).await.unwrap_err();

    assert!(matches!(err, StoreError::Transport(_)));
    let state = stores.owner.state();
    assert!(!state.loading);
    assert!(state.error_message.unwrap().starts_with("Transport error"));
}

#[tokio::test]
async fn test_local_patch_mode_skips_refetch() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = EntityStores::from_config(&server.config(ReconcileMode::LocalPatch)).unwrap();
    stores.owner.list(None).await.unwrap();
    server.backend.clear_requests();

    let created = stores
        .owner
        .create(&Owner {
            name: Some("Cy".to_string()),
            gender: Some("X".to_string()),
            ..Owner::default()
        })
        .await
        .unwrap();
    stores.owner.delete(EntityId(1)).await.unwrap();

    let ids: Vec<_> = stores.owner.state().entities.iter().filter_map(|o| o.id).collect();
    assert_eq!(ids, vec![EntityId(2), created.id.unwrap()]);
    assert_eq!(server.backend.count(Method::Get, "api/owners"), 0);
}

#[tokio::test]
async fn test_concurrent_fetches_settle() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();

    let (a, b, c) = tokio::join!(
        stores.car.list(Some(SortSpec::asc("name"))),
        stores.car.get(EntityId(4)),
        stores.owner.list(None),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let cars = stores.car.state();
    assert!(!cars.loading);
    assert_eq!(cars.entities.len(), 3);
    assert_eq!(cars.entity.name.as_deref(), Some("Accord"));
    assert_eq!(stores.owner.state().entities.len(), 2);
}
