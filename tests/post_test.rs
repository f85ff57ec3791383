mod common;

use serde_json::Value;

#[tokio::test]
async fn create_and_get_post() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "postuser").await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Test Post",
            "content": "Hello, world!"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let post_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["title"], "Test Post");
    assert_eq!(body["data"]["user_id"], user_id);
    assert_eq!(body["data"]["rating"], 0);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Test Post");
    assert_eq!(body["data"]["content"], "Hello, world!");
    assert_eq!(body["data"]["author"]["id"], user_id);
    assert!(body["data"]["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_post_with_empty_title_fails() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "postuser").await;

    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "",
            "content": "content"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn list_posts_returns_overviews() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "lister").await;
    let first = common::create_test_post(&app, &token, "First").await;
    common::create_test_post(&app, &token, "Second").await;

    let resp = app
        .client
        .post(app.url("/comments"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "post_id": first,
            "content": "nice"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/posts"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);

    let first_overview = posts
        .iter()
        .find(|p| p["id"].as_i64() == Some(first as i64))
        .unwrap();
    assert_eq!(first_overview["comment_count"], 1);
    assert!(first_overview["author"]["username"]
        .as_str()
        .unwrap()
        .starts_with("lister"));
}

#[tokio::test]
async fn only_author_can_update_post() {
    let app = common::spawn_app().await;
    let (_author_id, author_token) = common::create_test_user(&app, "author").await;
    let (_other_id, other_token) = common::create_test_user(&app, "other").await;
    let post_id = common::create_test_post(&app, &author_token, "Original").await;

    let resp = app
        .client
        .patch(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({
            "title": "Hijacked",
            "content": "nope"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Only the author can edit this post.");

    let resp = app
        .client
        .patch(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author_token)
        .json(&serde_json::json!({
            "title": "Edited",
            "content": "better content"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Edited");
}

#[tokio::test]
async fn delete_post_hides_it() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "deleter").await;
    let (_other_id, other_token) = common::create_test_user(&app, "other").await;
    let post_id = common::create_test_post(&app, &token, "Short lived").await;

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        format!("Post with ID {} has been successfully deleted.", post_id)
    );

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn get_missing_post_is_not_found() {
    let app = common::spawn_app().await;
    let (_user_id, token) = common::create_test_user(&app, "seeker").await;

    let resp = app
        .client
        .get(app.url("/posts/9999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
