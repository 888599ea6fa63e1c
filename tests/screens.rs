mod common;

use common::{app, nook, op, post, test_config, ScriptedApi};
use fesnuk::domain::Attachment;
use fesnuk::storage::MemoryReactionStore;
use fesnuk::{App, Config};
use std::sync::Arc;

#[tokio::test]
async fn feed_load_and_failure() {
    let api = ScriptedApi::new();
    api.with_posts(vec![post(1, "a", &[]), post(2, "b", &[])]);
    let store = Arc::new(MemoryReactionStore::new());
    let mut feed = app(&api, &store).feed();
    let mut updates = feed.subscribe();

    feed.load_posts().await;
    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.posts.len(), 2);
    assert!(!state.is_loading);

    api.fail(op::LIST_POSTS);
    feed.refresh_posts().await;
    let state = feed.state();
    assert_eq!(state.posts.len(), 2);
    assert_eq!(state.error_message.as_deref(), Some("API call failed with code: 500"));
}

#[tokio::test]
async fn nooks_filter_and_retry() {
    let api = ScriptedApi::new();
    api.with_nooks(vec![nook("1", "Rust Lang"), nook("2", "Cooking"), nook("3", "Rusty Bikes")]);
    api.fail(op::LIST_NOOKS);
    let store = Arc::new(MemoryReactionStore::new());
    let mut nooks = app(&api, &store).nooks();

    nooks.set_query("rust");
    nooks.load_nooks().await;
    assert!(nooks.state().error_message.is_some());

    api.recover(op::LIST_NOOKS);
    nooks.retry().await;
    let state = nooks.state();
    assert!(state.error_message.is_none());
    assert_eq!(state.nooks.len(), 3);
    let names: Vec<_> = state.filtered.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Rust Lang", "Rusty Bikes"]);

    nooks.set_query("");
    assert_eq!(nooks.state().filtered.len(), 3);
}

#[tokio::test]
async fn nook_detail_loads_nook_then_posts() {
    let api = ScriptedApi::new();
    api.with_nooks(vec![nook("a", "Alpha")]);
    api.with_posts(vec![post(1, "a", &[]), post(2, "b", &[]), post(3, "a", &[])]);
    let store = Arc::new(MemoryReactionStore::new());
    let mut detail = app(&api, &store).nook_detail();

    detail.load_nook_detail("a").await;
    let state = detail.state();
    assert_eq!(state.nook.map(|n| n.name), Some("Alpha".to_string()));
    let ids: Vec<_> = state.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(!state.is_loading && !state.is_loading_posts);

    detail.retry("missing").await;
    assert!(detail.state().error_message.is_some());
    assert_eq!(api.calls_to(op::LIST_POSTS_BY_NOOK), 1);
}

#[test]
fn attachment_urls_join_the_configured_base() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryReactionStore::new());
    let image = Attachment::image("abc.png", "cat.png");

    assert_eq!(
        app(&api, &store).attachment_url(&image),
        "https://fesnukberust.blob.core.windows.net/storage/attachments/abc.png"
    );

    let config = Config {
        attachment_base_url: "https://blobs.test/files".to_string(),
        ..test_config()
    };
    let app = App::new(api.clone(), store.clone(), config);
    assert_eq!(app.attachment_url(&image), "https://blobs.test/files/abc.png");
}
