//! Integration tests for `DirectoryClient::fetch_participants` against a
//! local axum server standing in for the directory.

use axum::{http::StatusCode, routing::get, Router};
use directory_client::{DirectoryClient, DirectoryError};
use std::time::Duration;

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn directory_app() -> Router {
    Router::new()
        .route(
            "/participants",
            get(|| async {
                r#"[{"OrganisationId": "org-1", "AuthorisationServers": []}]"#
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        )
        .route("/object", get(|| async { r#"{"data": []}"# }))
        .route("/html", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        )
}

#[tokio::test]
async fn test_fetch_returns_participants() {
    let base = serve(directory_app()).await;
    let client = DirectoryClient::new(format!("{}/participants", base)).unwrap();

    let participants = client.fetch_participants().await.unwrap();

    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["OrganisationId"], "org-1");
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let base = serve(directory_app()).await;
    let client = DirectoryClient::new(format!("{}/broken", base)).unwrap();

    let err = client.fetch_participants().await.unwrap_err();

    match &err {
        DirectoryError::Status { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_object_body_is_malformed() {
    let base = serve(directory_app()).await;
    let client = DirectoryClient::new(format!("{}/object", base)).unwrap();

    let err = client.fetch_participants().await.unwrap_err();
    assert!(matches!(err, DirectoryError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let base = serve(directory_app()).await;
    let client = DirectoryClient::new(format!("{}/html", base)).unwrap();

    let err = client.fetch_participants().await.unwrap_err();
    assert!(matches!(err, DirectoryError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let base = serve(directory_app()).await;
    let client =
        DirectoryClient::with_timeout(format!("{}/slow", base), Duration::from_millis(200))
            .unwrap();

    let err = client.fetch_participants().await.unwrap_err();
    assert!(matches!(err, DirectoryError::Transport(_)));
    assert!(err.is_transport());
}
