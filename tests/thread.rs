mod common;

use common::{app, comment, op, post, ScriptedApi};
use fesnuk::app::ThreadController;
use fesnuk::storage::MemoryReactionStore;
use std::sync::Arc;

async fn opened_thread(api: &Arc<ScriptedApi>) -> ThreadController {
    let store = Arc::new(MemoryReactionStore::new());
    let mut thread = app(api, &store).thread();
    thread.load_post(1).await;
    thread
}

fn scripted() -> Arc<ScriptedApi> {
    let api = ScriptedApi::new();
    api.with_posts(vec![post(1, "general", &[])]);
    api.with_comments(1, vec![comment(7, 1, None, 1), comment(10, 1, None, 2)]);
    api.with_replies(7, vec![comment(70, 1, Some(7), 0)]);
    api
}

#[tokio::test]
async fn loading_a_post_loads_its_roots_in_order() {
    let api = scripted();
    let thread = opened_thread(&api).await;

    let state = thread.state();
    assert_eq!(state.post.as_ref().map(|p| p.id), Some(1));
    let ids: Vec<_> = state.comments.roots().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![7, 10]);
    assert!(!state.is_loading);
    assert!(!state.is_loading_comments);
    assert_eq!(api.calls_to(op::LIST_REPLIES), 0);
}

#[tokio::test]
async fn failed_post_load_skips_comments() {
    let api = scripted();
    api.fail(op::GET_POST);
    let thread = opened_thread(&api).await;

    let state = thread.state();
    assert!(state.error_message.is_some());
    assert!(state.post.is_none());
    assert_eq!(api.calls_to(op::LIST_COMMENTS), 0);
}

#[tokio::test]
async fn replies_are_fetched_once_per_root() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;

    thread.toggle_comment_expansion(7).await;
    assert_eq!(api.calls_to(op::LIST_REPLIES), 1);
    assert!(thread.state().comments.is_expanded(7));
    assert_eq!(thread.state().comments.replies_for(7).map(<[_]>::len), Some(1));

    thread.toggle_comment_expansion(7).await;
    assert!(!thread.state().comments.is_expanded(7));

    thread.toggle_comment_expansion(7).await;
    assert!(thread.state().comments.is_expanded(7));
    assert_eq!(api.calls_to(op::LIST_REPLIES), 1);
}

#[tokio::test]
async fn failed_reply_fetch_is_retried_on_next_expand() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;
    api.fail(op::LIST_REPLIES);

    thread.toggle_comment_expansion(7).await;
    let state = thread.state();
    assert!(state.comments.replies_for(7).is_none());
    assert!(state.comment_error_message.is_some());
    assert!(state.loading_replies.is_empty());

    api.recover(op::LIST_REPLIES);
    thread.toggle_comment_expansion(7).await;
    thread.toggle_comment_expansion(7).await;
    assert_eq!(api.calls_to(op::LIST_REPLIES), 2);
    assert!(thread.state().comments.replies_for(7).is_some());
}

#[tokio::test]
async fn start_reply_forces_expansion_and_fetches() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;

    thread.toggle_comment_expansion(7).await;
    thread.start_reply(7).await;

    let state = thread.state();
    assert_eq!(state.comments.replying_to(), Some(7));
    assert!(state.comments.is_expanded(7));
    assert_eq!(api.calls_to(op::LIST_REPLIES), 1);

    thread.cancel_reply();
    assert_eq!(thread.state().comments.replying_to(), None);
}

#[tokio::test]
async fn successful_reply_reloads_roots_and_refreshes_replies() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;
    assert_eq!(api.calls_to(op::LIST_COMMENTS), 1);

    thread.set_reply_text("thanks");
    api.with_comments(1, vec![comment(7, 1, None, 1), comment(10, 1, None, 3)]);
    api.with_replies(10, vec![comment(11, 1, Some(10), 0), comment(12, 1, Some(10), 0), comment(13, 1, Some(10), 0)]);

    thread.reply_to_comment(1, 10, "thanks").await;

    let state = thread.state();
    assert_eq!(api.calls_to(op::REPLY), 1);
    assert_eq!(api.calls_to(op::LIST_COMMENTS), 2);
    assert_eq!(api.calls_to(op::LIST_REPLIES), 1);
    assert_eq!(state.comments.replying_to(), None);
    assert_eq!(state.comments.roots()[1].reply_count, 3);
    assert_eq!(state.comments.replies_for(10).map(<[_]>::len), Some(3));
    assert!(state.reply_text.is_empty());
    assert!(!state.is_posting_comment);
}

#[tokio::test]
async fn failed_reply_keeps_target_and_draft() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;
    thread.start_reply(10).await;
    thread.set_reply_text("thanks");
    api.fail(op::REPLY);

    thread.submit_reply().await;

    let state = thread.state();
    assert_eq!(state.comments.replying_to(), Some(10));
    assert_eq!(state.reply_text, "thanks");
    assert!(state.comment_error_message.is_some());
    assert!(!state.is_posting_comment);
    assert_eq!(api.calls_to(op::LIST_COMMENTS), 1);
}

#[tokio::test]
async fn blank_comment_makes_no_request() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;
    let before = api.total_calls();

    thread.post_comment(1, "   ").await;
    thread.reply_to_comment(1, 7, "").await;

    assert_eq!(api.total_calls(), before);
    assert!(thread.state().comment_error_message.is_some());
}

#[tokio::test]
async fn top_level_comment_reloads_roots() {
    let api = scripted();
    let mut thread = opened_thread(&api).await;
    api.with_comments(1, vec![comment(7, 1, None, 1), comment(10, 1, None, 2), comment(15, 1, None, 0)]);

    thread.post_comment(1, "first!").await;
    assert_eq!(thread.state().comments.roots().len(), 3);

    api.fail(op::POST_COMMENT);
    thread.post_comment(1, "second").await;
    let state = thread.state();
    assert!(state.comment_error_message.is_some());
    assert_eq!(state.comments.roots().len(), 3);
}

#[tokio::test]
async fn opening_another_post_discards_the_tree() {
    let api = scripted();
    api.with_posts(vec![post(1, "general", &[]), post(2, "general", &[])]);
    let mut thread = opened_thread(&api).await;
    thread.toggle_comment_expansion(7).await;

    thread.load_post(2).await;
    let state = thread.state();
    assert!(state.comments.roots().is_empty());
    assert!(!state.comments.is_expanded(7));

    thread.refresh(2).await;
    assert_eq!(api.calls_to(op::GET_POST), 3);
}
