use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{
    fs,
    path::PathBuf,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

async fn test_app(tag: &str) -> (Router, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "sibyl-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let connect_opts = SqliteConnectOptions::from_str(&database_url)
        .expect("invalid database url")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_opts)
        .await
        .expect("failed to open sqlite pool");
    sibyl::db::init_schema(&pool).await.expect("schema init failed");

    let state = sibyl::router::SibylState::new(pool, reqwest::Client::new());
    (sibyl::router::sibyl_router(state), temp_path)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

async fn put_key(app: &Router, key: &str, provider: &str, model: &str, user_id: Option<&str>) {
    let mut body = json!({ "key": key, "provider": provider, "model": model });
    if let Some(user_id) = user_id {
        body["user_id"] = json!(user_id);
    }
    let resp = app
        .clone()
        .oneshot(post_json("/update_api_key", body))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
}

async fn fetch_key(app: &Router, provider: &str, user_id: Option<&str>) -> (StatusCode, Value) {
    let uri = match user_id {
        Some(user_id) => format!("/get_api_key?provider={provider}&user_id={user_id}"),
        None => format!("/get_api_key?provider={provider}"),
    };
    let resp = app.clone().oneshot(get(&uri)).await.expect("request failed");
    let status = resp.status();
    (status, body_json(resp).await)
}

#[tokio::test]
async fn update_then_get_returns_the_latest_key() {
    let (app, temp_path) = test_app("supersede").await;

    put_key(&app, "sk-1", "openai", "gpt-3.5-turbo", None).await;
    let (status, body) = fetch_key(&app, "openai", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-1");
    assert_eq!(body["provider"], "openai");
    assert_eq!(body["model"], "gpt-3.5-turbo");

    put_key(&app, "sk-2", "openai", "gpt-4", None).await;
    let (status, body) = fetch_key(&app, "openai", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-2");
    assert_eq!(body["model"], "gpt-4");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn user_scope_and_global_scope_never_cross_invalidate() {
    let (app, temp_path) = test_app("scopes").await;

    put_key(&app, "sk-global", "openai", "gpt-3.5-turbo", None).await;
    put_key(&app, "sk-u1", "openai", "gpt-4", Some("u1")).await;

    // The user-scoped update must not have touched the global key.
    let (status, body) = fetch_key(&app, "openai", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-global");

    let (status, body) = fetch_key(&app, "openai", Some("u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-u1");
    assert_eq!(body["user_id"], "u1");

    // And the other way around: a global update leaves u1's key alone.
    put_key(&app, "sk-global-2", "openai", "gpt-3.5-turbo", None).await;
    let (status, body) = fetch_key(&app, "openai", Some("u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-u1");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn blank_user_id_means_the_global_scope() {
    let (app, temp_path) = test_app("blank-user").await;

    put_key(&app, "sk-global", "openai", "gpt-3.5-turbo", None).await;

    // An explicit empty user_id reads the shared scope, not a "" partition.
    let (status, body) = fetch_key(&app, "openai", Some("")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-global");

    // And writes it: this supersedes the global key rather than creating a
    // phantom row scoped to an empty string.
    put_key(&app, "sk-global-2", "openai", "gpt-3.5-turbo", Some("")).await;
    let (status, body) = fetch_key(&app, "openai", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "sk-global-2");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn scopes_are_partitioned_per_provider() {
    let (app, temp_path) = test_app("providers").await;

    put_key(&app, "sk-oai", "openai", "gpt-4", None).await;
    put_key(&app, "sk-ant", "anthropic", "claude-3-sonnet-20240229", None).await;

    let (_, body) = fetch_key(&app, "openai", None).await;
    assert_eq!(body["key"], "sk-oai");
    let (_, body) = fetch_key(&app, "anthropic", None).await;
    assert_eq!(body["key"], "sk-ant");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn get_api_key_without_a_record_is_not_found() {
    let (app, temp_path) = test_app("no-record").await;

    let (status, body) = fetch_key(&app, "anthropic", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "No valid API key found for provider: anthropic"
    );

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn get_api_key_requires_a_provider_param() {
    let (app, temp_path) = test_app("no-provider").await;

    let resp = app
        .oneshot(get("/get_api_key"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn update_rejects_a_model_outside_the_allow_list() {
    let (app, temp_path) = test_app("bad-model").await;

    let resp = app
        .oneshot(post_json(
            "/update_api_key",
            json!({ "key": "sk-1", "provider": "openai", "model": "claude-3-sonnet-20240229" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Unsupported model"));

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn ask_with_unknown_provider_is_rejected() {
    let (app, temp_path) = test_app("ask-provider").await;

    let resp = app
        .oneshot(post_json(
            "/ask",
            json!({ "question": "Q", "webpage_content": "C", "provider": "palm" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Unsupported provider")
    );

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn ask_with_a_model_outside_the_allow_list_is_rejected() {
    let (app, temp_path) = test_app("ask-model").await;

    let resp = app
        .oneshot(post_json(
            "/ask",
            json!({ "question": "Q", "webpage_content": "C", "provider": "openai", "model": "gpt-99" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn ask_with_a_blank_model_falls_through_to_the_credential_default() {
    let (app, temp_path) = test_app("blank-model").await;

    // A blank model means "not supplied": it must not be rejected as
    // unsupported, so the request proceeds to credential resolution.
    let resp = app
        .oneshot(post_json(
            "/ask",
            json!({ "question": "Q", "webpage_content": "C", "provider": "openai", "model": "" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "No valid API key found for provider: openai");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn ask_without_a_stored_credential_reports_the_missing_key() {
    let (app, temp_path) = test_app("ask-no-key").await;

    let resp = app
        .oneshot(post_json(
            "/ask",
            json!({ "question": "Q", "webpage_content": "C", "provider": "openai" }),
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "No valid API key found for provider: openai");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn ask_requires_question_and_webpage_content() {
    let (app, temp_path) = test_app("ask-missing").await;

    let resp = app
        .oneshot(post_json("/ask", json!({ "question": "Q" })))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("webpage_content")
    );

    let _ = fs::remove_file(&temp_path);
}
