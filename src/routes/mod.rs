use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    public_routes().merge(protected)
}

/// Registration and login.
fn public_routes() -> Router {
    Router::new()
        .route("/users/register", routing::post(handlers::register))
        .route("/users/login", routing::post(handlers::login))
}

/// Everything else needs a bearer token.
fn protected_routes() -> Router {
    Router::new()
        // Users
        .route(
            "/users/me",
            routing::get(handlers::user::get_current_user)
                .delete(handlers::user::delete_current_user),
        )
        // Posts
        .route(
            "/posts",
            routing::get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/{id}",
            routing::get(handlers::post::get_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        // Votes
        .route(
            "/posts/{id}/vote-up",
            routing::patch(handlers::vote::vote_up),
        )
        .route(
            "/posts/{id}/vote-down",
            routing::patch(handlers::vote::vote_down),
        )
        // Comments
        .route(
            "/comments",
            routing::get(handlers::comment::list_comments)
                .post(handlers::comment::create_comment),
        )
        .route(
            "/comments/{id}",
            routing::get(handlers::comment::get_comment)
                .patch(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
}
