pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    attempt_service::AttemptService, category_service::CategoryService,
    comment_service::CommentService, daily_service::DailyService,
    favorite_service::FavoriteService, leaderboard_service::LeaderboardService,
    mistake_service::MistakeService, question_service::QuestionService,
    tutor_service::TutorService, user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub question_service: QuestionService,
    pub category_service: CategoryService,
    pub attempt_service: AttemptService,
    pub mistake_service: MistakeService,
    pub daily_service: DailyService,
    pub favorite_service: FavoriteService,
    pub comment_service: CommentService,
    pub leaderboard_service: LeaderboardService,
    pub tutor_service: TutorService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let user_service = UserService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let category_service = CategoryService::new(pool.clone());
        let attempt_service = AttemptService::new(pool.clone());
        let mistake_service = MistakeService::new(pool.clone());
        let daily_service = DailyService::new(pool.clone());
        let favorite_service = FavoriteService::new(pool.clone());
        let comment_service = CommentService::new(pool.clone());
        let leaderboard_service = LeaderboardService::new(pool.clone());
        let tutor_service = TutorService::new(config.deepseek_api_key.clone(), http_client);

        Self {
            pool,
            user_service,
            question_service,
            category_service,
            attempt_service,
            mistake_service,
            daily_service,
            favorite_service,
            comment_service,
            leaderboard_service,
            tutor_service,
        }
    }
}
