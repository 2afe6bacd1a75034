use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use quizhub_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/questions", get(routes::questions::list_questions))
        .route("/api/questions/:id", get(routes::questions::get_question))
        .route("/api/categories", get(routes::categories::list_categories))
        .route("/api/categories/:id", get(routes::categories::get_category))
        .route(
            "/api/leaderboard",
            get(routes::leaderboard::get_leaderboard),
        )
        .route("/api/daily", get(routes::daily::get_daily_challenge))
        .route("/api/comments", get(routes::comments::list_comments))
        .layer(axum::middleware::from_fn(
            middleware::auth::optional_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let user_api = Router::new()
        .route(
            "/api/auth/me",
            get(routes::auth::me).patch(routes::auth::update_me),
        )
        .route("/api/attempts", post(routes::attempts::submit_attempt))
        .route("/api/attempts/my", get(routes::attempts::list_my_attempts))
        .route(
            "/api/attempts/mistakes",
            get(routes::attempts::list_mistakes),
        )
        .route(
            "/api/attempts/mastered",
            post(routes::attempts::mark_mastered),
        )
        .route(
            "/api/favorites",
            get(routes::favorites::list_favorites).post(routes::favorites::add_favorite),
        )
        .route(
            "/api/favorites/check/:question_id",
            get(routes::favorites::check_favorite),
        )
        .route(
            "/api/favorites/:question_id",
            delete(routes::favorites::remove_favorite),
        )
        .route("/api/comments", post(routes::comments::create_comment))
        .route(
            "/api/comments/:id",
            axum::routing::patch(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route("/api/users/progress", get(routes::users::get_progress))
        .route("/api/users/upgrade", post(routes::users::upgrade_to_pro))
        .route("/api/chat", post(routes::chat::chat_with_tutor))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.api_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(user_api)
        .with_state(app_state)
        .layer(middleware::cors::cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
