pub mod auth;
pub mod comment;
pub mod overview;
pub mod post;
pub mod user;
pub mod vote;
