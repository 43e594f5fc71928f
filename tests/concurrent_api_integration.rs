//! Concurrent API integration tests
//!
//! These tests verify that link creation and redirects stay consistent when
//! many requests race for the same rows.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use linklens::api;
use linklens::auth::AuthService;
use linklens::config::{AuthConfig, AuthMode, ClientIpConfig, RedirectMode};
use linklens::links::LinkService;
use linklens::redirect::{self, RedirectResolver, RequestContext};
use linklens::storage::{SqliteStorage, Storage};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create test storage
async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

fn create_api(storage: &Arc<dyn Storage>, short_code_max_length: usize) -> Router {
    let auth = AuthService::new(AuthConfig {
        mode: AuthMode::None,
        default_owner: "local".to_string(),
        jwt: None,
    })
    .unwrap();
    api::create_api_router(Arc::clone(storage), Arc::new(auth), short_code_max_length)
}

fn create_link_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/links")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_alias_creation() {
    let storage = create_test_storage().await;
    let app = create_api(&storage, 64);

    let mut handles = vec![];
    for i in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(create_link_request(json!({
                "originalUrl": format!("https://example.com/{i}"),
                "customAlias": "contested"
            })))
            .await
            .unwrap()
            .status()
        }));
    }

    let mut ok = 0;
    let mut taken = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::BAD_REQUEST => taken += 1,
            other => panic!("Unexpected status: {other}"),
        }
    }

    assert_eq!(ok, 1, "Exactly one request should claim the alias");
    assert_eq!(taken, 9);
}

#[tokio::test]
async fn test_concurrent_generated_codes_are_unique() {
    let storage = create_test_storage().await;
    let app = create_api(&storage, 64);

    let mut handles = vec![];
    for i in 0..50 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let response = app
                .oneshot(create_link_request(json!({
                    "originalUrl": format!("https://example.com/{i}")
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            body["shortCode"].as_str().unwrap().to_string()
        }));
    }

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap());
    }

    assert_eq!(codes.len(), 50);
    assert_eq!(storage.list_links("local").await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_short_code_max_length_enforced() {
    let storage = create_test_storage().await;
    let app = create_api(&storage, 8);

    let too_long = app
        .clone()
        .oneshot(create_link_request(json!({
            "originalUrl": "https://example.com",
            "customAlias": "nine-char"
        })))
        .await
        .unwrap();
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);

    let fits = app
        .oneshot(create_link_request(json!({
            "originalUrl": "https://example.com",
            "customAlias": "eight-ch"
        })))
        .await
        .unwrap();
    assert_eq!(fits.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_redirects_count_every_click() {
    let storage = create_test_storage().await;
    let service = LinkService::new(Arc::clone(&storage), 64);
    let link = service
        .create_link("local", "https://example.com/hot", Some("hot"), None)
        .await
        .unwrap();

    let app = redirect::create_redirect_router(
        Arc::clone(&storage),
        ClientIpConfig::default(),
        RedirectMode::Found,
    );

    let mut handles = vec![];
    for i in 0..40u16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let mut req = Request::builder().uri("/hot").body(Body::empty()).unwrap();
            req.extensions_mut()
                .insert(axum::extract::connect_info::ConnectInfo(SocketAddr::from((
                    [127, 0, 0, 1],
                    10_000 + i,
                ))));
            app.oneshot(req).await.unwrap().status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::FOUND);
    }

    let stored = storage.get_link_by_code("hot").await.unwrap().unwrap();
    assert_eq!(stored.click_count, 40);
    assert_eq!(storage.list_clicks(link.id).await.unwrap().len(), 40);
}

#[tokio::test]
async fn test_concurrent_delete_and_resolve() {
    let storage = create_test_storage().await;
    let service = LinkService::new(Arc::clone(&storage), 64);
    let link = service
        .create_link("local", "https://example.com/brief", Some("brief"), None)
        .await
        .unwrap();

    let resolver = RedirectResolver::new(Arc::clone(&storage));
    let mut handles = vec![];
    for _ in 0..20 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            resolver.resolve("brief", &RequestContext::default()).await
        }));
    }

    let delete = {
        let service = service.clone();
        tokio::spawn(async move { service.delete("local", link.id).await })
    };

    for handle in handles {
        // Either the redirect won the race or the link was already gone
        match handle.await.unwrap() {
            Ok(target) => assert_eq!(target, "https://example.com/brief"),
            Err(linklens::error::ServiceError::NotFound) => {}
            Err(linklens::error::ServiceError::Storage(_)) => {}
            Err(other) => panic!("Unexpected error: {other:?}"),
        }
    }
    delete.await.unwrap().unwrap();

    assert!(storage.get_link_by_code("brief").await.unwrap().is_none());
    assert!(storage.list_clicks(link.id).await.unwrap().is_empty());
}
