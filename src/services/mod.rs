pub mod attempt_service;
pub mod category_service;
pub mod comment_service;
pub mod daily_service;
pub mod favorite_service;
pub mod grading_service;
pub mod leaderboard_service;
pub mod mistake_service;
pub mod question_service;
pub mod tutor_service;
pub mod user_service;
