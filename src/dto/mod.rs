pub mod attempt_dto;
pub mod auth_dto;
pub mod chat_dto;
pub mod comment_dto;
pub mod favorite_dto;
pub mod question_dto;
