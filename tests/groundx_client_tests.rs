// GroundX client tests against a mock server
// Author: kelexine (https://github.com/kelexine)

use gxtract::cache::{MetadataProvider, RefreshCoordinator, ResourceRepository};
use gxtract::config::GroundxConfig;
use gxtract::error::AppError;
use gxtract::groundx::GroundxClient;
use std::sync::Arc;
use std::time::Duration;

fn client_for(server: &mockito::ServerGuard, max_retries: u32) -> GroundxClient {
    GroundxClient::new(&GroundxConfig {
        api_key: Some("test-key".to_string()),
        api_base_url: server.url(),
        max_retries,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_projects() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/group")
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"groups":[
                {"groupId": 101, "name": "Research", "buckets": []},
                {"groupId": "202", "name": "Archive"},
                {"name": "missing id"}
            ]}"#,
        )
        .create_async()
        .await;

    let projects = client_for(&server, 1).list_projects().await.unwrap();
    mock.assert_async().await;

    let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["101", "202"]);
    assert_eq!(projects[0].name, "Research");
}

#[tokio::test]
async fn test_list_buckets_for_project() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group/101")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"group":{"groupId":101,"name":"Research","buckets":[
                {"bucketId": 1, "name": "Papers"},
                {"bucketId": 2, "name": "Datasets"}
            ]}}"#,
        )
        .create_async()
        .await;

    let buckets = client_for(&server, 1)
        .list_buckets_for_project("101")
        .await
        .unwrap();

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].id, "1");
    assert_eq!(buckets[1].name, "Datasets");
    assert!(buckets.iter().all(|b| b.project_id == "101"));
}

#[tokio::test]
async fn test_group_without_buckets_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group/7")
        .with_status(200)
        .with_body(r#"{"group":{"groupId":7,"name":"Empty"}}"#)
        .create_async()
        .await;

    let buckets = client_for(&server, 1)
        .list_buckets_for_project("7")
        .await
        .unwrap();
    assert!(buckets.is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/group")
        .with_status(401)
        .with_body(r#"{"message":"invalid apiKey=test-key"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server, 3).list_projects().await.unwrap_err();
    mock.assert_async().await;

    match err {
        AppError::Unauthorized(body) => assert!(!body.contains("test-key")),
        other => panic!("expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unavailable_is_retried_up_to_limit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/group")
        .with_status(503)
        .with_header("retry-after", "0")
        .with_body("maintenance")
        .expect(3)
        .create_async()
        .await;

    let err = client_for(&server, 3).list_projects().await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(err, AppError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = client_for(&server, 1).list_projects().await.unwrap_err();
    assert!(matches!(err, AppError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_refresh_through_client_with_partial_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group")
        .with_status(200)
        .with_body(r#"{"groups":[{"groupId":1,"name":"One"},{"groupId":2,"name":"Two"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/group/1")
        .with_status(200)
        .with_body(r#"{"group":{"groupId":1,"buckets":[{"bucketId":10,"name":"Ten"}]}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/v1/group/2")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let repository = Arc::new(ResourceRepository::new(true, Duration::from_secs(3600)));
    let coordinator = RefreshCoordinator::new(
        repository.clone(),
        Arc::new(client_for(&server, 1)),
        Duration::from_secs(10),
    );

    let outcome = coordinator.refresh().await.unwrap();
    assert_eq!(outcome.project_count, 2);
    assert_eq!(outcome.bucket_count, 1);
    assert_eq!(outcome.failed_projects, vec!["2".to_string()]);
    assert_eq!(repository.lookup_bucket("10").unwrap().project_id, "1");
}

#[tokio::test]
async fn test_embedded_buckets_skip_group_requests() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group")
        .with_status(200)
        .with_body(
            r#"{"groups":[
                {"groupId":1,"name":"One","buckets":[{"bucketId":10,"name":"Ten"},{"bucketId":11,"name":"Eleven"}]},
                {"groupId":2,"name":"Two","buckets":[]}
            ]}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let group_one = server
        .mock("GET", "/v1/group/1")
        .with_status(200)
        .with_body(r#"{"group":{"groupId":1,"buckets":[]}}"#)
        .expect(0)
        .create_async()
        .await;
    let group_two = server
        .mock("GET", "/v1/group/2")
        .with_status(200)
        .with_body(r#"{"group":{"groupId":2,"buckets":[{"bucketId":20,"name":"Twenty"}]}}"#)
        .expect(1)
        .create_async()
        .await;

    let repository = Arc::new(ResourceRepository::new(true, Duration::from_secs(3600)));
    let coordinator = RefreshCoordinator::new(
        repository.clone(),
        Arc::new(client_for(&server, 1)),
        Duration::from_secs(10),
    );

    let outcome = coordinator.refresh().await.unwrap();
    group_one.assert_async().await;
    group_two.assert_async().await;

    assert_eq!(outcome.project_count, 2);
    assert_eq!(outcome.bucket_count, 3);
    assert_eq!(repository.lookup_bucket("11").unwrap().project_id, "1");
    assert_eq!(repository.lookup_bucket("20").unwrap().project_id, "2");
}

#[tokio::test]
async fn test_embedded_buckets_are_used_once() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/group")
        .with_status(200)
        .with_body(r#"{"groups":[{"groupId":1,"name":"One","buckets":[{"bucketId":10,"name":"Ten"}]}]}"#)
        .create_async()
        .await;
    let group_one = server
        .mock("GET", "/v1/group/1")
        .with_status(200)
        .with_body(r#"{"group":{"groupId":1,"buckets":[{"bucketId":12,"name":"Twelve"}]}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 1);
    client.list_projects().await.unwrap();

    let from_listing = client.list_buckets_for_project("1").await.unwrap();
    assert_eq!(from_listing[0].id, "10");

    // A direct call without a fresh listing goes to the group endpoint
    let fetched = client.list_buckets_for_project("1").await.unwrap();
    assert_eq!(fetched[0].id, "12");
    group_one.assert_async().await;
}
