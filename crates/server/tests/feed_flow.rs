//! End-to-end scenarios over the feed service: auth, ownership consistency,
//! pagination, and broadcast ordering.

use std::time::Duration;

use feed_server::config::{AppState, ServerConfig};
use feed_server::error::ApiError;
use feed_server::identity::Identity;
use feed_server::models::{FeedAction, PostInput};
use tempfile::TempDir;

async fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        database_url: dir.path().join("feed.sqlite").display().to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        client_host: None,
        image_dir: dir.path().join("images"),
    };

    let state = feed_server::build_state(&config).await.unwrap();
    state.images.ensure_dir().await.unwrap();
    (state, dir)
}

async fn signed_up_user(state: &AppState, email: &str, name: &str) -> Identity {
    let user = state
        .service
        .signup(email, name, "12345")
        .await
        .unwrap();
    Identity::Authenticated { user_id: user.id }
}

fn post_input(title: &str, content: &str) -> PostInput {
    PostInput {
        title: title.to_string(),
        content: content.to_string(),
        image_url: "images/test.png".to_string(),
    }
}

#[tokio::test]
async fn signup_login_create_delete_flow() {
    let (state, _dir) = test_state().await;

    let user = state
        .service
        .signup("a@b.com", "Alex", "12345")
        .await
        .unwrap();
    assert_eq!(user.email, "a@b.com");

    let login = state.service.login("a@b.com", "12345").await.unwrap();
    assert_eq!(login.user_id, user.id);
    assert!(!login.token.is_empty());

    let identity = Identity::Authenticated {
        user_id: login.user_id.clone(),
    };
    let post = state
        .service
        .create_post(&identity, &post_input("Hello World", "First post body"))
        .await
        .unwrap();

    // Appears as the page-1 item.
    let page = state.service.posts_page(Some(1)).await.unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.posts[0].id, post.id);
    assert_eq!(page.posts[0].creator.name, "Alex");

    state.service.delete_post(&identity, &post.id).await.unwrap();

    let page = state.service.posts_page(Some(1)).await.unwrap();
    assert_eq!(page.total_items, 0);
    assert!(page.posts.is_empty());

    let profile = state.service.profile(&identity).await.unwrap();
    assert!(profile.posts.is_empty());
}

#[tokio::test]
async fn ownership_list_tracks_post_collection() {
    let (state, _dir) = test_state().await;
    let identity = signed_up_user(&state, "owner@b.com", "Owner").await;

    let first = state
        .service
        .create_post(&identity, &post_input("first title", "first content"))
        .await
        .unwrap();
    let second = state
        .service
        .create_post(&identity, &post_input("second title", "second content"))
        .await
        .unwrap();

    let profile = state.service.profile(&identity).await.unwrap();
    assert_eq!(profile.posts, vec![first.id.clone(), second.id.clone()]);

    state
        .service
        .delete_post(&identity, &first.id)
        .await
        .unwrap();

    let profile = state.service.profile(&identity).await.unwrap();
    assert_eq!(profile.posts, vec![second.id.clone()]);

    // Every listed post resolves and points back at the owner.
    for post_id in &profile.posts {
        let post = state.service.post(&identity, post_id).await.unwrap();
        assert_eq!(post.creator.id, profile.id);
    }
}

#[tokio::test]
async fn non_creator_mutations_are_forbidden_and_leave_post_unchanged() {
    let (state, _dir) = test_state().await;
    let alice = signed_up_user(&state, "alice@b.com", "Alice").await;
    let bob = signed_up_user(&state, "bob@b.com", "Bob").await;

    let post = state
        .service
        .create_post(&alice, &post_input("Alice post", "Alice content"))
        .await
        .unwrap();

    let err = state
        .service
        .update_post(&bob, &post.id, &post_input("Hijacked!", "Bob content"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let err = state.service.delete_post(&bob, &post.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden));

    let unchanged = state.service.post(&alice, &post.id).await.unwrap();
    assert_eq!(unchanged.title, "Alice post");
    assert_eq!(unchanged.content, "Alice content");
}

#[tokio::test]
async fn pagination_is_deterministic_and_complete() {
    let (state, _dir) = test_state().await;
    let identity = signed_up_user(&state, "pager@b.com", "Pager").await;

    let mut created = Vec::new();
    for i in 0..5 {
        let post = state
            .service
            .create_post(
                &identity,
                &post_input(&format!("post number {}", i), "some body text"),
            )
            .await
            .unwrap();
        created.push(post.id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Repeated calls with no intervening writes return identical pages.
    let once = state.service.posts_page(Some(1)).await.unwrap();
    let twice = state.service.posts_page(Some(1)).await.unwrap();
    assert_eq!(once.posts, twice.posts);
    assert_eq!(once.total_items, 5);

    // Newest first.
    assert_eq!(once.posts[0].id, created[4]);

    // Concatenating all pages yields the full set, no duplicates.
    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = state.service.posts_page(Some(page)).await.unwrap();
        assert!(result.posts.len() <= 2);
        for post in result.posts {
            assert!(!seen.contains(&post.id));
            seen.push(post.id);
        }
    }
    assert_eq!(seen.len(), 5);
    for id in &created {
        assert!(seen.contains(id));
    }
}

#[tokio::test]
async fn empty_store_page_is_valid() {
    let (state, _dir) = test_state().await;

    let page = state.service.posts_page(None).await.unwrap();
    assert_eq!(page.total_items, 0);
    assert!(page.posts.is_empty());

    // Pages past the end are equally valid.
    let page = state.service.posts_page(Some(40)).await.unwrap();
    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn anonymous_identity_is_rejected_at_the_operation() {
    let (state, _dir) = test_state().await;

    let err = state
        .service
        .create_post(&Identity::Anonymous, &post_input("Valid title", "Valid body"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));

    let err = state.service.status(&Identity::Anonymous).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));
}

#[tokio::test]
async fn events_are_published_only_after_commit() {
    let (state, _dir) = test_state().await;
    let identity = signed_up_user(&state, "live@b.com", "Live").await;
    let mut rx = state.hub.subscribe();

    let created = state
        .service
        .create_post(&identity, &post_input("Streamed post", "Streamed body"))
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.action, FeedAction::Created);
    assert_eq!(event.post.id, created.id);
    // The post referenced by the event is durably visible.
    assert!(state.service.post(&identity, &event.post.id).await.is_ok());

    state
        .service
        .update_post(&identity, &created.id, &post_input("Edited post", "Edited body"))
        .await
        .unwrap();
    let event = rx.recv().await.unwrap();
    assert_eq!(event.action, FeedAction::Updated);
    assert_eq!(event.post.title, "Edited post");

    state
        .service
        .delete_post(&identity, &created.id)
        .await
        .unwrap();
    let event = rx.recv().await.unwrap();
    assert_eq!(event.action, FeedAction::Deleted);
    let err = state
        .service
        .post(&identity, &event.post.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn validation_and_conflict_failures() {
    let (state, _dir) = test_state().await;

    // Bad email and short password are both reported.
    let err = state
        .service
        .signup("not-an-email", "Sam", "123")
        .await
        .unwrap_err();
    match err {
        ApiError::Validation { errors, .. } => assert_eq!(errors.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }

    state
        .service
        .signup("taken@b.com", "First", "12345")
        .await
        .unwrap();
    let err = state
        .service
        .signup("taken@b.com", "Second", "12345")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // Login failures: unknown user vs wrong password.
    let err = state
        .service
        .login("nobody@b.com", "12345")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = state
        .service
        .login("taken@b.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated(_)));

    // Short title on create.
    let identity = signed_up_user(&state, "writer@b.com", "Writer").await;
    let err = state
        .service
        .create_post(&identity, &post_input("1234", "long enough body"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[tokio::test]
async fn status_defaults_then_follows_updates() {
    let (state, _dir) = test_state().await;
    let identity = signed_up_user(&state, "status@b.com", "Stats").await;

    // Fresh accounts start with the default status.
    let status = state.service.status(&identity).await.unwrap();
    assert_eq!(status, "I am new!");

    let updated = state
        .service
        .update_status(&identity, "Shipping the feed")
        .await
        .unwrap();
    assert_eq!(updated, "Shipping the feed");

    let status = state.service.status(&identity).await.unwrap();
    assert_eq!(status, "Shipping the feed");

    let profile = state.service.profile(&identity).await.unwrap();
    assert_eq!(profile.status, "Shipping the feed");

    // A credential whose user no longer resolves is a 404, not a 401.
    let stale = Identity::Authenticated {
        user_id: "no-such-user".to_string(),
    };
    let err = state.service.status(&stale).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    let err = state
        .service
        .update_status(&stale, "ghost writes")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn update_bumps_timestamp_and_can_retain_image() {
    let (state, _dir) = test_state().await;
    let identity = signed_up_user(&state, "editor@b.com", "Editor").await;

    let post = state
        .service
        .create_post(&identity, &post_input("Original title", "Original body"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    // Empty image field retains the stored one.
    let mut input = post_input("Updated title", "Updated body");
    input.image_url = String::new();
    let updated = state
        .service
        .update_post(&identity, &post.id, &input)
        .await
        .unwrap();

    assert_eq!(updated.image_url, post.image_url);
    assert_eq!(updated.created_at, post.created_at);
    assert!(updated.updated_at > post.updated_at);
}
