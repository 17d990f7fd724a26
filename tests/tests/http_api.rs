use application::answer_service::AnswerService;
use application::rag_service::RagService;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use presentation::server::router;
use serde_json::{json, Value};
use std::sync::Arc;
use tests::{sample_corpus, KeywordEmbedder, RecordingGenerator};
use tower::ServiceExt;

fn app(generator: RecordingGenerator) -> axum::Router {
    let rag = Arc::new(RagService::new(
        sample_corpus(),
        Arc::new(KeywordEmbedder::default()),
    ));
    router(Arc::new(AnswerService::new(rag, Arc::new(generator))))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn post_returns_answer_and_links() {
    let response = app(RecordingGenerator::answering("Run docker build."))
        .oneshot(post_json("/api/", json!({"question": "How do I build a docker image?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["answer"], "Run docker build.");
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0]["url"], "https://tds.s-anand.net/#/docker");
    assert!(links[0]["text"].as_str().unwrap().len() <= 253);
}

#[tokio::test]
async fn path_without_trailing_slash_is_served() {
    let response = app(RecordingGenerator::answering("ok"))
        .oneshot(post_json("/api", json!({"question": "git?"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn out_of_scope_year_returns_empty_links() {
    let response = app(RecordingGenerator::answering("unused"))
        .oneshot(post_json("/api/", json!({"question": "Exam dates for 2024?"})))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["links"], json!([]));
}

#[tokio::test]
async fn malformed_image_is_bad_request() {
    let response = app(RecordingGenerator::answering("unused"))
        .oneshot(post_json(
            "/api/",
            json!({"question": "q", "image": "aGk=", "mimeType": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("mime_type"));
}

#[tokio::test]
async fn unparseable_body_gets_a_detail_message() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/")
        .header("content-type", "application/json")
        .body(Body::from("{\"question\": "))
        .unwrap();
    let response = app(RecordingGenerator::answering("unused"))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_question_gets_a_detail_message() {
    let response = app(RecordingGenerator::answering("unused"))
        .oneshot(post_json("/api/", json!({"image": "aGk="})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn generation_failure_is_a_generic_server_error() {
    let response = app(RecordingGenerator::failing("secret upstream detail"))
        .oneshot(post_json("/api/", json!({"question": "How do I use git?"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "failed to answer the question");
}

#[tokio::test]
async fn health_reports_corpus_size() {
    let response = app(RecordingGenerator::answering("unused"))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chunks"], 3);
    assert_eq!(body["embedding_model"], "keyword-test");
}
