pub mod attempt;
pub mod category;
pub mod comment;
pub mod favorite;
pub mod question;
pub mod user;
