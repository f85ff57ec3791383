mod common;

use blog_backend::error::AppError;
use blog_backend::models::{Post, PostModel};
use blog_backend::services::{post::PostService, vote::VoteService};
use sea_orm::{DatabaseConnection, EntityTrait};

async fn stored_post(db: &DatabaseConnection, id: i32) -> PostModel {
    Post::find_by_id(id).one(db).await.unwrap().unwrap()
}

async fn stored_vote_value(db: &DatabaseConnection, user_id: i32, post_id: i32) -> Option<i16> {
    VoteService::find_by_user_and_post(db, user_id, post_id)
        .await
        .unwrap()
        .map(|v| v.value)
}

#[tokio::test]
async fn post_without_votes_has_zero_rating() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let post = common::insert_post(&db, &author, "Quiet post").await;

    assert_eq!(VoteService::sum_vote_values_for_post(&db, post.id).await.unwrap(), 0);

    let post = VoteService::calculate_rating_for_post(&db, post).await.unwrap();
    assert_eq!(post.rating, 0);
}

#[tokio::test]
async fn upvote_twice_is_rejected_and_keeps_first_vote() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Vote me").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_up(post, voter.id).await.unwrap();
    assert_eq!(post.rating, 1);

    let err = service.vote_up(post.clone(), voter.id).await.unwrap_err();
    match err {
        AppError::IllegalVote(msg) => assert_eq!(msg, "You have already upvoted this post."),
        other => panic!("expected IllegalVote, got {:?}", other),
    }

    assert_eq!(stored_vote_value(&db, voter.id, post.id).await, Some(1));
    assert_eq!(stored_post(&db, post.id).await.rating, 1);
}

#[tokio::test]
async fn downvote_twice_is_rejected() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Vote me").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_down(post, voter.id).await.unwrap();
    assert_eq!(post.rating, -1);

    let err = service.vote_down(post.clone(), voter.id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalVote(_)));
    assert_eq!(stored_vote_value(&db, voter.id, post.id).await, Some(-1));
}

#[tokio::test]
async fn opposite_votes_cancel_out() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Back and forth").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_up(post, voter.id).await.unwrap();
    let post = service.vote_down(post, voter.id).await.unwrap();

    assert_eq!(post.rating, 0);
    assert_eq!(stored_vote_value(&db, voter.id, post.id).await, Some(0));
    assert_eq!(stored_post(&db, post.id).await.rating, 0);
}

#[tokio::test]
async fn swinging_from_down_to_up_takes_two_steps() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Swing").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_down(post, voter.id).await.unwrap();
    let post = service.vote_up(post, voter.id).await.unwrap();
    assert_eq!(post.rating, 0);

    let post = service.vote_up(post, voter.id).await.unwrap();
    assert_eq!(post.rating, 1);
    assert_eq!(stored_vote_value(&db, voter.id, post.id).await, Some(1));
}

#[tokio::test]
async fn rating_sums_votes_from_several_users() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let alice = common::insert_user(&db, "alice").await;
    let bob = common::insert_user(&db, "bob").await;
    let carol = common::insert_user(&db, "carol").await;
    let post = common::insert_post(&db, &author, "Crowd").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_up(post, alice.id).await.unwrap();
    let post = service.vote_down(post, bob.id).await.unwrap();
    assert_eq!(post.rating, 0);

    // Alice goes back to neutral, Bob's downvote remains.
    let post = service.vote_down(post, alice.id).await.unwrap();
    assert_eq!(post.rating, -1);
    assert_eq!(stored_vote_value(&db, alice.id, post.id).await, Some(0));

    // First vote from a new user creates a row holding 1.
    assert_eq!(stored_vote_value(&db, carol.id, post.id).await, None);
    let post = service.vote_up(post, carol.id).await.unwrap();
    assert_eq!(stored_vote_value(&db, carol.id, post.id).await, Some(1));
    assert_eq!(post.rating, 0);
    assert_eq!(stored_post(&db, post.id).await.rating, 0);
}

#[tokio::test]
async fn recalculating_is_idempotent() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Stable").await;

    let post = VoteService::new(db.clone()).vote_up(post, voter.id).await.unwrap();

    let first = VoteService::persist_rating(&db, post).await.unwrap();
    let second = VoteService::persist_rating(&db, first.clone()).await.unwrap();
    assert_eq!(first.rating, 1);
    assert_eq!(second.rating, 1);
    assert_eq!(stored_post(&db, second.id).await.rating, 1);
}

#[tokio::test]
async fn deleted_votes_do_not_count() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let alice = common::insert_user(&db, "alice").await;
    let bob = common::insert_user(&db, "bob").await;
    let post = common::insert_post(&db, &author, "Pruned").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_up(post, alice.id).await.unwrap();
    let post = service.vote_up(post, bob.id).await.unwrap();
    assert_eq!(post.rating, 2);

    let vote = VoteService::find_by_user_and_post(&db, bob.id, post.id)
        .await
        .unwrap()
        .unwrap();
    service.soft_delete(vote).await.unwrap();

    assert_eq!(VoteService::sum_vote_values_for_post(&db, post.id).await.unwrap(), 1);
    assert_eq!(VoteService::list_for_post(&db, post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stale_ratings_are_refreshed_on_read() {
    use blog_backend::models::post;
    use sea_orm::{sea_query::Expr, ColumnTrait, QueryFilter};

    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post_model = common::insert_post(&db, &author, "Stale").await;
    let post_id = post_model.id;

    VoteService::new(db.clone())
        .vote_up(post_model, voter.id)
        .await
        .unwrap();

    Post::update_many()
        .col_expr(post::Column::Rating, Expr::value(42))
        .filter(post::Column::Id.eq(post_id))
        .exec(&db)
        .await
        .unwrap();

    let detail = PostService::new(db.clone()).get_detail(post_id).await.unwrap();
    assert_eq!(detail.post.rating, 1);
    assert_eq!(stored_post(&db, post_id).await.rating, 1);
}

#[tokio::test]
async fn concurrent_first_vote_is_rejected_not_a_database_error() {
    use blog_backend::services::vote::VoteDirection;

    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Double click").await;

    // Both requests saw no vote yet; the first insert wins.
    VoteService::insert_vote(&db, voter.id, post.id, 1, VoteDirection::Up)
        .await
        .unwrap();
    let err = VoteService::insert_vote(&db, voter.id, post.id, 1, VoteDirection::Up)
        .await
        .unwrap_err();
    match err {
        AppError::IllegalVote(msg) => assert_eq!(msg, "You have already upvoted this post."),
        other => panic!("expected IllegalVote, got {:?}", other),
    }

    assert_eq!(stored_vote_value(&db, voter.id, post.id).await, Some(1));
    assert_eq!(VoteService::list_for_post(&db, post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn voting_again_revives_a_deleted_vote() {
    let db = common::setup_db().await;
    let author = common::insert_user(&db, "author").await;
    let voter = common::insert_user(&db, "voter").await;
    let post = common::insert_post(&db, &author, "Second chance").await;
    let service = VoteService::new(db.clone());

    let post = service.vote_up(post, voter.id).await.unwrap();
    let vote = VoteService::find_by_user_and_post(&db, voter.id, post.id)
        .await
        .unwrap()
        .unwrap();
    service.soft_delete(vote).await.unwrap();
    assert_eq!(VoteService::sum_vote_values_for_post(&db, post.id).await.unwrap(), 0);

    // The deleted upvote no longer counts, so upvoting is legal again.
    let post = service.vote_up(post, voter.id).await.unwrap();
    assert_eq!(post.rating, 1);

    let vote = VoteService::find_by_user_and_post(&db, voter.id, post.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!vote.deleted);
    assert_eq!(vote.value, 1);
    assert_eq!(stored_post(&db, post.id).await.rating, 1);
}
