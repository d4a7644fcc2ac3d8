//! Integration tests for Crossref-backed filename derivation.

use doi2pdf_core::{CrossrefNamer, NamingError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_filename_from_crossref_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works/10.1000/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "message": {
                "title": ["A Study of Things"],
                "author": [
                    {"family": "smith", "given": "Ann"},
                    {"family": "doe"}
                ],
                "type": "journal-article"
            }
        })))
        .mount(&server)
        .await;

    let namer = CrossrefNamer::with_base_url(server.uri()).expect("client should build");
    let filename = namer.filename("10.1000/xyz").await.expect("lookup");
    assert_eq!(filename, "Smith_Doe__A_Study_of_Things.pdf");
}

#[tokio::test]
async fn test_unknown_doi_reports_status() {
    let server = MockServer::start().await;
    // No mock mounted: the works endpoint answers 404.

    let namer = CrossrefNamer::with_base_url(server.uri()).expect("client should build");
    let err = namer
        .filename("10.1000/nope")
        .await
        .expect_err("404 should fail");
    match err {
        NamingError::Status { doi, status } => {
            assert_eq!(doi, "10.1000/nope");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_metadata_without_title_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works/10.1000/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "message": {"author": [{"family": "Smith"}]}
        })))
        .mount(&server)
        .await;

    let namer = CrossrefNamer::with_base_url(server.uri()).expect("client should build");
    let err = namer
        .filename("10.1000/bare")
        .await
        .expect_err("missing title should fail");
    assert!(matches!(err, NamingError::MissingTitle { .. }));
}
