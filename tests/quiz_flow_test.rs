use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn init_test_config() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("DEEPSEEK_API_KEY", "sk-test");
    env::set_var("PUBLIC_RPS", "100");
    env::set_var("API_RPS", "100");
    let _ = quizhub_backend::config::init_config();
}

fn full_router(state: quizhub_backend::AppState) -> Router {
    let public_api = Router::new()
        .route(
            "/api/auth/register",
            post(quizhub_backend::routes::auth::register),
        )
        .route("/api/auth/login", post(quizhub_backend::routes::auth::login))
        .route(
            "/api/questions",
            get(quizhub_backend::routes::questions::list_questions),
        )
        .route(
            "/api/questions/:id",
            get(quizhub_backend::routes::questions::get_question),
        )
        .route(
            "/api/leaderboard",
            get(quizhub_backend::routes::leaderboard::get_leaderboard),
        )
        .route(
            "/api/daily",
            get(quizhub_backend::routes::daily::get_daily_challenge),
        )
        .route(
            "/api/comments",
            get(quizhub_backend::routes::comments::list_comments),
        )
        .layer(axum::middleware::from_fn(
            quizhub_backend::middleware::auth::optional_bearer_auth,
        ));

    let user_api = Router::new()
        .route(
            "/api/auth/me",
            get(quizhub_backend::routes::auth::me).patch(quizhub_backend::routes::auth::update_me),
        )
        .route(
            "/api/attempts",
            post(quizhub_backend::routes::attempts::submit_attempt),
        )
        .route(
            "/api/attempts/my",
            get(quizhub_backend::routes::attempts::list_my_attempts),
        )
        .route(
            "/api/attempts/mistakes",
            get(quizhub_backend::routes::attempts::list_mistakes),
        )
        .route(
            "/api/attempts/mastered",
            post(quizhub_backend::routes::attempts::mark_mastered),
        )
        .route(
            "/api/favorites",
            get(quizhub_backend::routes::favorites::list_favorites)
                .post(quizhub_backend::routes::favorites::add_favorite),
        )
        .route(
            "/api/favorites/check/:question_id",
            get(quizhub_backend::routes::favorites::check_favorite),
        )
        .route(
            "/api/favorites/:question_id",
            delete(quizhub_backend::routes::favorites::remove_favorite),
        )
        .route(
            "/api/comments",
            post(quizhub_backend::routes::comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            axum::routing::patch(quizhub_backend::routes::comments::update_comment)
                .delete(quizhub_backend::routes::comments::delete_comment),
        )
        .route(
            "/api/users/progress",
            get(quizhub_backend::routes::users::get_progress),
        )
        .route(
            "/api/users/upgrade",
            post(quizhub_backend::routes::users::upgrade_to_pro),
        )
        .layer(axum::middleware::from_fn(
            quizhub_backend::middleware::auth::require_bearer_auth,
        ));

    public_api.merge(user_api).with_state(state)
}

async fn body_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_req(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn json_req(method: &str, uri: &str, token: &str, body: &JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// Needs a running Postgres pointed to by DATABASE_URL; run with --ignored.
#[tokio::test]
#[ignore]
async fn quiz_flow_end_to_end() {
    init_test_config();
    let pool = quizhub_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    // A question of our own so reruns and seed edits cannot interfere.
    let question_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO questions (title, content, type, options, correct_answer, explanation, difficulty)
        VALUES ($1, $2, 'single', '["two", "four", "six"]'::jsonb, 'B', 'Two and two make four.', 'easy')
        RETURNING id
        "#,
    )
    .bind(format!("Arithmetic {}", Uuid::new_v4()))
    .bind("What is 2 + 2?")
    .fetch_one(&pool)
    .await
    .expect("seed question");

    let app = full_router(quizhub_backend::AppState::new(pool.clone()));

    // Register and keep the issued token.
    let email = format!("flow_{}@example.com", Uuid::new_v4());
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": "secret123" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered = body_json(resp).await;
    let token = registered["token"].as_str().expect("token").to_string();
    assert_eq!(registered["user"]["email"], email.as_str());
    // Nickname defaults to the email local-part.
    assert_eq!(
        registered["user"]["nickname"],
        email.split('@').next().unwrap()
    );

    // Duplicate registration is a 400.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": "secret123" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Login with the same credentials works; a wrong password is a 401.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": "secret123" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": "wrong-pass" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong answer lands the question in the mistake book.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/attempts",
            &token,
            &json!({ "question_id": question_id, "selected": "A", "time_spent": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let graded = body_json(resp).await;
    assert_eq!(graded["is_correct"], false);
    assert_eq!(graded["normalized_answer"], "A");

    let resp = app
        .clone()
        .oneshot(get_req("/api/attempts/mistakes", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let mistakes = body_json(resp).await;
    assert!(mistakes
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["question_id"] == json!(question_id)));

    // A later correct answer resolves it.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/attempts",
            &token,
            &json!({ "question_id": question_id, "selected": "B", "time_spent": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let graded = body_json(resp).await;
    assert_eq!(graded["is_correct"], true);

    let resp = app
        .clone()
        .oneshot(get_req("/api/attempts/mistakes", &token))
        .await
        .unwrap();
    let mistakes = body_json(resp).await;
    assert!(!mistakes
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["question_id"] == json!(question_id)));

    // Wrong again, then manual mastery instead of re-answering.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/attempts",
            &token,
            &json!({ "question_id": question_id, "selected": "C" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/attempts/mastered",
            &token,
            &json!({ "question_id": question_id }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(get_req("/api/attempts/mistakes", &token))
        .await
        .unwrap();
    let mistakes = body_json(resp).await;
    assert!(!mistakes
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["question_id"] == json!(question_id)));

    // Marking a resolved question again is rejected.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/attempts/mastered",
            &token,
            &json!({ "question_id": question_id }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Attempt history is visible, newest first.
    let resp = app
        .clone()
        .oneshot(get_req(
            &format!("/api/attempts/my?question_id={}", question_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history = body_json(resp).await;
    assert!(history.as_array().unwrap().len() >= 4);

    // Favorites round trip.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/favorites",
            &token,
            &json!({ "question_id": question_id, "notes": "tricky" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(get_req(
            &format!("/api/favorites/check/{}", question_id),
            &token,
        ))
        .await
        .unwrap();
    let check = body_json(resp).await;
    assert_eq!(check["is_favorite"], true);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/favorites/{}", question_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Comments: create, list, edit, delete.
    let resp = app
        .clone()
        .oneshot(json_req(
            "POST",
            "/api/comments",
            &token,
            &json!({ "question_id": question_id, "content": "Why not A?" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment = body_json(resp).await;
    let comment_id = comment["id"].as_str().expect("comment id").to_string();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/comments?question_id={}", question_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let comments = body_json(resp).await;
    assert!(!comments.as_array().unwrap().is_empty());

    let resp = app
        .clone()
        .oneshot(json_req(
            "PATCH",
            &format!("/api/comments/{}", comment_id),
            &token,
            &json!({ "content": "Because two plus two is four." }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/comments/{}", comment_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Progress and leaderboard reflect the recorded attempts.
    let resp = app
        .clone()
        .oneshot(get_req("/api/users/progress", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let progress = body_json(resp).await;
    assert!(progress["overall"]["answered_questions"].as_i64().unwrap() >= 1);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/leaderboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Daily challenge is deterministic for a fixed date.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/daily?date=2026-03-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let first_daily = body_json(resp).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/daily?date=2026-03-15")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let second_daily = body_json(resp).await;
    assert_eq!(first_daily["questions"], second_daily["questions"]);
    assert!(first_daily["questions"].as_array().unwrap().len() <= 3);

    // Upgrade flips the pro flag and appends an order.
    let resp = app
        .clone()
        .oneshot(json_req("POST", "/api/users/upgrade", &token, &json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let upgraded = body_json(resp).await;
    assert_eq!(upgraded["user"]["is_pro"], true);

    let user_id: Uuid =
        serde_json::from_value(upgraded["user"]["id"].clone()).expect("user id");
    let order_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1 AND status = 'completed'")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("order count");
    assert_eq!(order_count, 1);
}
