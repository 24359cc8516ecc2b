use std::sync::Arc;

use mise_client::{
    AccountBackend, ClientError, ErrorKind, HttpClient, MemorySession, RecipeBackend,
    SessionProvider, StaticSession, SuggestionBackend,
};
use mise_types::{Credentials, ProfileUpdateRequest, SetupStep};
use mockito::Matcher;
use serde_json::json;

fn suggestion_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "thread_id": "t1",
        "suggestion": {
            "title": title,
            "description": "Weeknight dinner",
            "ingredients": [{"name": "rice", "quantity": 1, "unit": "cup"}],
            "steps": ["Cook the rice"],
            "servings": 2,
            "total_time_minutes": 25
        },
        "response_text": format!("Try {}", title),
        "accepted": false,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

fn thread_json() -> serde_json::Value {
    json!({
        "id": "t1",
        "recipe_id": null,
        "original_prompt": "something with rice",
        "current_prompt": "something with rice",
        "suggestions": [suggestion_json("s1", "Fried Rice")],
        "current_recipe": null,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

fn client(url: &str, session: Arc<dyn SessionProvider>) -> HttpClient {
    HttpClient::builder().base_url(url).session(session).build().unwrap()
}

#[tokio::test]
async fn test_get_thread_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/thread/t1")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(thread_json().to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let thread = client.get_thread("t1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(thread.id, "t1");
    assert_eq!(thread.suggestions.len(), 1);
    assert_eq!(thread.suggestions[0].suggestion.title, "Fried Rice");
    assert!(!thread.suggestions[0].rejected);
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/thread/t1")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(thread_json().to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::anonymous()));
    client.get_thread("t1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_next_suggestion_sends_refined_prompt_and_keeps_last() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/thread/t1/suggest")
        .match_body(Matcher::Json(json!({ "prompt": "no meat" })))
        .with_status(200)
        .with_body(json!([suggestion_json("s2", "Veggie Rice"), suggestion_json("s3", "Rice Salad")]).to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let suggestion = client
        .request_next_suggestion("t1", Some("no meat"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(suggestion.id, "s3");
}

#[tokio::test]
async fn test_next_suggestion_empty_batch_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/thread/t1/suggest")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let err = client.request_next_suggestion("t1", None).await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyResponse));
}

#[tokio::test]
async fn test_error_envelope_is_decoded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/thread/t1/accept/s1")
        .with_status(404)
        .with_body(json!({"error": {"code": "THREAD_NOT_FOUND", "message": "Thread not found"}}).to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let err = client.accept_suggestion("t1", "s1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body.code, "THREAD_NOT_FOUND");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_error_body_falls_back_to_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/recipes")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let err = client.list_recipes().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.user_message(), "HTTP 502");
}

#[tokio::test]
async fn test_login_stores_token_in_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/login")
        .match_body(Matcher::Json(json!({"email": "ada@example.com", "password": "hunter22"})))
        .with_status(200)
        .with_body(json!({"token": "fresh-token"}).to_string())
        .create_async()
        .await;
    let profile = server
        .mock("GET", "/profile")
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body(json!({"setup_step": "skill", "name": "Ada"}).to_string())
        .create_async()
        .await;

    let session = Arc::new(MemorySession::new());
    let client = client(&server.url(), session.clone());

    client
        .login(&Credentials::new("ada@example.com", "hunter22"))
        .await
        .unwrap();
    assert_eq!(session.token().as_deref(), Some("fresh-token"));

    let fetched = client.get_profile().await.unwrap();
    profile.assert_async().await;
    assert_eq!(fetched.setup_step, SetupStep::Skill);
}

#[tokio::test]
async fn test_save_profile_uses_put() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/profile")
        .match_body(Matcher::Json(json!({"setup_step": "skill", "name": "Ada"})))
        .with_status(200)
        .with_body(json!({"setup_step": "skill", "name": "Ada"}).to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let saved = client
        .save_profile(&ProfileUpdateRequest::new(SetupStep::Skill).name("Ada"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(saved.name, "Ada");
}

#[tokio::test]
async fn test_ask_question_returns_answer() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/thread/t1/question")
        .match_body(Matcher::Json(json!({"question": "Can I freeze it?"})))
        .with_status(200)
        .with_body(json!({"answer": "Up to three months"}).to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let answer = client.ask_question("t1", "Can I freeze it?").await.unwrap();
    assert_eq!(answer, "Up to three months");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = client("http://127.0.0.1:9", Arc::new(StaticSession::anonymous()));
    let err = client.get_thread("t1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_reject_suggestion_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    client.reject_suggestion("t1", "s1").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_modify_recipe_posts_prompt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/recipes/r1/modify/chat")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::Json(json!({"prompt": "make it spicy"})))
        .with_status(200)
        .with_body(
            json!({
                "title": "Spicy Fried Rice",
                "description": "With chilli oil",
                "ingredients": [{"name": "rice", "quantity": 1, "unit": "cup"}],
                "steps": ["Cook the rice", "Add chilli oil"],
                "servings": 2,
                "total_time_minutes": 25
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let recipe = client.modify_recipe("r1", "make it spicy").await.unwrap();

    mock.assert_async().await;
    assert_eq!(recipe.title, "Spicy Fried Rice");
    assert_eq!(recipe.steps.len(), 2);
}

#[tokio::test]
async fn test_modify_unknown_recipe_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/recipes/missing/modify/chat")
        .with_status(404)
        .with_body(json!({"error": {"code": "THREAD_NOT_FOUND", "message": "Thread not found"}}).to_string())
        .create_async()
        .await;

    let client = client(&server.url(), Arc::new(StaticSession::new("secret")));
    let err = client.modify_recipe("missing", "less salt").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
