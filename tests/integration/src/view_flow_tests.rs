//! Screen flows end to end: view -> store -> HTTP -> backend

use crate::test_utils::{seed_fleet, TestServer};
use motorpool_domain::{Car, FieldError, FormValues};
use motorpool_store::Method;
use motorpool_views::{DeleteDialog, DetailView, EditView, ListView, Route};
use serde_json::json;
use std::sync::Arc;

fn form(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_create_car_through_form() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();
    let mut edit = EditView::new(Arc::clone(&stores.car)).with_relation(stores.owner.clone());

    edit.mount(None).await.unwrap();
    assert!(edit.default_values().is_empty());
    assert_eq!(edit.relation_options("owner"), vec!["1", "2"]);

    let saved = edit
        .submit(&form(&[("name", "Test"), ("model", "T"), ("price", "12.5"), ("owner", "")]))
        .await
        .unwrap();

    assert_eq!(saved.price, Some(12.5));
    let post = server
        .backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post)
        .unwrap();
    assert_eq!(post.body, Some(json!({ "name": "Test", "model": "T", "price": 12.5 })));

    assert_eq!(edit.poll_navigation(), Some(Route::list::<Car>()));
    assert_eq!(edit.poll_navigation(), None);
    assert_eq!(stores.car.state().entities.len(), 4);
}

#[tokio::test]
async fn test_edit_car_changes_owner() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();
    let mut edit = EditView::new(Arc::clone(&stores.car)).with_relation(stores.owner.clone());

    edit.mount(Some("3")).await.unwrap();
    let mut values = edit.default_values();
    assert_eq!(values.get("owner").map(String::as_str), Some("1"));
    values.insert("owner".to_string(), "2".to_string());

    let saved = edit.submit(&values).await.unwrap();

    assert_eq!(saved.owner.map(|o| o.id.value()), Some(2));
    let put = server
        .backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Put)
        .unwrap();
    assert_eq!(put.path, "api/cars/3");
    assert_eq!(put.body.unwrap()["owner"]["id"], json!(2));
}

#[tokio::test]
async fn test_invalid_form_never_hits_the_wire() {
    let server = TestServer::start().await;
    let stores = server.stores();
    let mut edit = EditView::new(Arc::clone(&stores.car)).with_relation(stores.owner.clone());
    edit.mount(None).await.unwrap();
    server.backend.clear_requests();

    let err = edit
        .submit(&form(&[("name", "X"), ("model", ""), ("price", "12,5")]))
        .await
        .unwrap_err();

    let errors = err.validation().unwrap();
    assert_eq!(errors.for_field("model"), Some(FieldError::REQUIRED));
    assert_eq!(errors.for_field("price"), Some(FieldError::NOT_A_NUMBER));
    assert!(server.backend.requests().is_empty());
    assert_eq!(edit.poll_navigation(), None);
}

#[tokio::test]
async fn test_list_then_detail_then_delete() {
    let server = TestServer::start().await;
    seed_fleet(&server.backend);
    let stores = server.stores();

    let mut list = ListView::new(Arc::clone(&stores.car));
    list.mount().await.unwrap();
    list.sort_by("name").await.unwrap();
    let first = list.rows().remove(0);
    assert_eq!(first.name.as_deref(), Some("Accord"));

    let detail = DetailView::new(Arc::clone(&stores.car));
    detail.mount("4").await.unwrap();
    assert_eq!(detail.rows()[4].value, "2");
    assert_eq!(detail.edit_route(), Some("/car/4/edit".parse().unwrap()));

    let mut dialog = DeleteDialog::new(Arc::clone(&stores.car));
    dialog.mount("4").await.unwrap();
    dialog.confirm().await.unwrap();

    assert_eq!(dialog.poll_navigation(), Some(Route::list::<Car>()));
    assert_eq!(server.backend.count(Method::Delete, "api/cars/4"), 1);
    assert_eq!(stores.car.state().entities.len(), 2);
    assert_eq!(list.rows().len(), 2);
}
