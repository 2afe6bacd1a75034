pub mod attempts;
pub mod auth;
pub mod categories;
pub mod chat;
pub mod comments;
pub mod daily;
pub mod favorites;
pub mod health;
pub mod leaderboard;
pub mod questions;
pub mod users;
