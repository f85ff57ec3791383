pub mod auth;
pub mod comment;
pub mod post;
pub mod user;
pub mod vote;

pub use auth::*;
