//! Comment thread cache scenarios
//!
//! Run with: cargo test -p integration-tests --test comment_tests

use feed_core::{EntityType, Snowflake, VoteSummary, VoteValue};
use integration_tests::memory::ops;
use integration_tests::{
    admin, assert_summaries_consistent, assert_thread_sorted, bob, carol, seed_posts, sf, Harness,
    MemoryStore, ALICE, BOB, CAROL,
};

/// Post 1 with comments 11, 12 (reply to 11) and 13, oldest first
fn seed_thread(store: &MemoryStore) -> Snowflake {
    let post_id = seed_posts(store, 1)[0];
    store.add_comment(sf(11), post_id, sf(BOB), "first", None);
    store.add_comment(sf(12), post_id, sf(CAROL), "reply to first", Some(sf(11)));
    store.add_comment(sf(13), post_id, sf(ALICE), "second", None);
    post_id
}

fn ids(comments: &[feed_core::Comment]) -> Vec<i64> {
    comments.iter().map(|c| c.id.into_inner()).collect()
}

#[tokio::test]
async fn test_fetch_thread_oldest_first() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    assert!(!comments.has_loaded(post_id));

    let outcome = comments.fetch_comments(Some(bob()), post_id).await;
    let thread = outcome.into_data().unwrap();

    assert_eq!(ids(&thread), vec![11, 12, 13]);
    assert_eq!(thread[1].parent_id, Some(sf(11)));
    assert!(thread[1].is_reply());
    assert_eq!(thread[0].author.as_ref().unwrap().username, "bob");
    assert_thread_sorted(&thread);

    assert!(comments.has_loaded(post_id));
    assert!(!comments.is_loading(post_id));
    assert_eq!(comments.error(post_id), None);
    assert_eq!(comments.comment_count(post_id), 3);
    assert_eq!(comments.owner_of(sf(12)), Some(post_id));
    assert_eq!(h.store.calls(ops::VOTE_LOOKUP), 1);
    assert_eq!(h.store.calls(ops::FAVORITE_LOOKUP), 0);
}

#[tokio::test]
async fn test_thread_decorated_for_viewer() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    h.store.add_vote(EntityType::Comment, sf(11), sf(BOB), VoteValue::Up);
    h.store.add_vote(EntityType::Comment, sf(11), sf(CAROL), VoteValue::Down);
    let comments = h.comments();

    comments.fetch_comments(Some(bob()), post_id).await;
    let thread = comments.comments_for_post(post_id);

    assert_eq!(thread[0].vote_summary, VoteSummary::new(1, 1));
    assert_eq!(thread[0].user_vote, 1);
    assert_eq!(thread[1].vote_summary, VoteSummary::default());
    assert_summaries_consistent(&thread);
}

#[tokio::test]
async fn test_failed_fetch_records_error() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    h.store.fail(ops::COMMENT_THREAD);
    let comments = h.comments();

    let outcome = comments.fetch_comments(None, post_id).await;
    assert!(!outcome.is_success());
    assert!(comments.error(post_id).unwrap().contains("injected failure"));
    assert!(!comments.is_loading(post_id));
    assert!(!comments.has_loaded(post_id));

    h.store.recover(ops::COMMENT_THREAD);
    comments.fetch_comments(None, post_id).await;
    assert_eq!(comments.error(post_id), None);
    assert!(comments.has_loaded(post_id));
}

#[tokio::test]
async fn test_add_comment_appends_and_counts() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    comments.fetch_comments(Some(carol()), post_id).await;

    let outcome = comments
        .add_comment(Some(carol()), post_id, "  late reply ", Some(sf(13)))
        .await;
    let comment = outcome.into_data().unwrap();

    assert_eq!(comment.content, "late reply");
    assert_eq!(comment.parent_id, Some(sf(13)));
    assert_eq!(comment.user_id, sf(CAROL));

    let thread = comments.comments_for_post(post_id);
    assert_eq!(thread.last().unwrap().id, comment.id);
    assert_thread_sorted(&thread);
    assert_eq!(comments.comment_count(post_id), 4);
    assert_eq!(comments.owner_of(comment.id), Some(post_id));
    assert_eq!(h.store.comment_ids(post_id).len(), 4);
}

#[tokio::test]
async fn test_add_comment_bumps_fetched_count() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();

    assert_eq!(comments.ensure_comment_count(post_id).await.into_data(), Some(3));
    comments.add_comment(Some(bob()), post_id, "hi", None).await;
    assert_eq!(comments.comment_count(post_id), 4);
}

#[tokio::test]
async fn test_add_comment_rejected_before_network() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();

    let blank = comments.add_comment(Some(bob()), post_id, " \n ", None).await;
    assert!(blank.error.unwrap().contains("Content must not be empty"));

    let anonymous = comments.add_comment(None, post_id, "hello", None).await;
    assert_eq!(anonymous.error.as_deref(), Some("Authentication required"));

    let no_post = comments.add_comment(Some(bob()), sf(0), "hello", None).await;
    assert!(!no_post.is_success());

    assert_eq!(h.store.calls(ops::COMMENT_CREATE), 0);
}

#[tokio::test]
async fn test_add_comment_to_missing_post() {
    let h = Harness::new();
    let comments = h.comments();

    let outcome = comments.add_comment(Some(bob()), sf(77), "hello", None).await;
    assert!(outcome.error.unwrap().contains("Post not found"));
    assert!(comments.comments_for_post(sf(77)).is_empty());
    assert_eq!(comments.comment_count(sf(77)), 0);
}

#[tokio::test]
async fn test_delete_comment_refetches_thread() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    comments.fetch_comments(Some(bob()), post_id).await;

    let outcome = comments.delete_comment(Some(bob()), sf(11)).await;
    assert!(outcome.is_success());

    // The reply went with its parent
    assert_eq!(ids(&comments.comments_for_post(post_id)), vec![13]);
    assert_eq!(comments.comment_count(post_id), 1);
    assert_eq!(comments.owner_of(sf(12)), None);
    assert_eq!(h.store.calls(ops::COMMENT_THREAD), 2);
}

#[tokio::test]
async fn test_delete_uncached_comment_skips_refetch() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();

    let outcome = comments.delete_comment(Some(bob()), sf(13)).await;
    assert!(outcome.is_success());
    assert_eq!(h.store.calls(ops::COMMENT_THREAD), 0);
    assert_eq!(h.store.comment_ids(post_id).len(), 2);
}

#[tokio::test]
async fn test_failed_delete_keeps_thread() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    comments.fetch_comments(None, post_id).await;
    h.store.fail(ops::COMMENT_DELETE);

    let outcome = comments.delete_comment(Some(bob()), sf(12)).await;
    assert!(!outcome.is_success());
    assert_eq!(ids(&comments.comments_for_post(post_id)), vec![11, 12, 13]);
    assert_eq!(comments.owner_of(sf(12)), Some(post_id));
    assert!(!comments.delete_comment(None, sf(12)).await.is_success());
}

#[tokio::test]
async fn test_comment_vote_toggle() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    h.store.add_vote(EntityType::Comment, sf(12), sf(CAROL), VoteValue::Up);
    let comments = h.comments();
    comments.fetch_comments(Some(bob()), post_id).await;

    let up = comments
        .toggle_comment_vote(Some(bob()), post_id, sf(12), VoteValue::Up)
        .await;
    assert_eq!(up.into_data(), Some(1));
    let reply = comments.comments_for_post(post_id)[1].clone();
    assert_eq!(reply.vote_summary, VoteSummary::new(2, 0));
    assert_eq!(reply.user_vote, 1);

    let down = comments
        .toggle_comment_vote(Some(bob()), post_id, sf(12), VoteValue::Down)
        .await;
    assert_eq!(down.into_data(), Some(-1));
    let reply = comments.comments_for_post(post_id)[1].clone();
    assert_eq!(reply.vote_summary, VoteSummary::new(1, 1));
    assert_eq!(h.store.vote_of(EntityType::Comment, sf(12), sf(BOB)), Some(VoteValue::Down));

    let cleared = comments
        .toggle_comment_vote(Some(bob()), post_id, sf(12), VoteValue::Down)
        .await;
    assert_eq!(cleared.into_data(), Some(0));
    assert_eq!(
        comments.comments_for_post(post_id)[1].vote_summary,
        VoteSummary::new(1, 0)
    );
}

#[tokio::test]
async fn test_comment_vote_needs_cached_comment() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();

    let outcome = comments
        .toggle_comment_vote(Some(bob()), post_id, sf(11), VoteValue::Up)
        .await;
    assert!(outcome.error.unwrap().contains("Comment not found"));
    assert_eq!(h.store.calls(ops::VOTE_UPSERT), 0);
}

#[tokio::test]
async fn test_second_viewer_comment_vote() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    h.store.add_vote(EntityType::Comment, sf(11), sf(BOB), VoteValue::Down);
    let comments = h.comments();
    comments.fetch_comments(Some(bob()), post_id).await;
    h.store.reset_calls();

    let up = comments
        .toggle_comment_vote(Some(carol()), post_id, sf(11), VoteValue::Up)
        .await;
    assert_eq!(up.into_data(), Some(1));
    assert_eq!(h.store.calls(ops::VOTE_LOOKUP), 1);
    assert_eq!(h.store.vote_of(EntityType::Comment, sf(11), sf(CAROL)), Some(VoteValue::Up));
    assert_eq!(h.store.vote_of(EntityType::Comment, sf(11), sf(BOB)), Some(VoteValue::Down));

    // Tally follows the store; the thread still shows Bob's vote
    let first = comments.comments_for_post(post_id)[0].clone();
    assert_eq!(first.vote_summary, VoteSummary::new(1, 1));
    assert_eq!(first.user_vote, -1);
    assert_summaries_consistent(&comments.comments_for_post(post_id));
}

#[tokio::test]
async fn test_comment_pin_moves_to_top() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    comments.fetch_comments(Some(admin()), post_id).await;

    let pinned = comments
        .toggle_comment_pin(Some(admin()), post_id, sf(13), true)
        .await
        .into_data()
        .unwrap();
    assert!(pinned.is_pinned);
    assert_eq!(pinned.pinned_by, Some(sf(ALICE)));

    let thread = comments.comments_for_post(post_id);
    assert_eq!(ids(&thread), vec![13, 11, 12]);
    assert_thread_sorted(&thread);

    comments
        .toggle_comment_pin(Some(admin()), post_id, sf(13), false)
        .await;
    assert_eq!(ids(&comments.comments_for_post(post_id)), vec![11, 12, 13]);
}

#[tokio::test]
async fn test_comment_pin_requires_admin() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    comments.fetch_comments(Some(bob()), post_id).await;

    let outcome = comments
        .toggle_comment_pin(Some(bob()), post_id, sf(13), true)
        .await;
    assert!(!outcome.is_success());
    assert_eq!(h.store.calls(ops::COMMENT_PIN), 0);
}

#[tokio::test]
async fn test_pin_uncached_comment_is_decorated() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    h.store.add_vote(EntityType::Comment, sf(13), sf(ALICE), VoteValue::Up);
    h.store.add_vote(EntityType::Comment, sf(13), sf(BOB), VoteValue::Up);
    let comments = h.comments();

    let pinned = comments
        .toggle_comment_pin(Some(admin()), post_id, sf(13), true)
        .await
        .into_data()
        .unwrap();
    assert!(pinned.is_pinned);
    assert_eq!(pinned.vote_summary, VoteSummary::new(2, 0));
    assert_eq!(pinned.user_vote, 1);

    // Loaded for Carol: the admin still gets their own vote back
    comments.fetch_comments(Some(carol()), post_id).await;
    let unpinned = comments
        .toggle_comment_pin(Some(admin()), post_id, sf(13), false)
        .await
        .into_data()
        .unwrap();
    assert!(!unpinned.is_pinned);
    assert_eq!(unpinned.user_vote, 1);
    assert_eq!(comments.comments_for_post(post_id)[2].user_vote, 0);
}

#[tokio::test]
async fn test_comment_counts() {
    let h = Harness::new();
    let post_id = seed_thread(&h.store);
    let comments = h.comments();
    assert!(!comments.has_count(post_id));

    assert_eq!(comments.fetch_comment_count(post_id).await.into_data(), Some(3));
    assert!(comments.has_count(post_id));

    // Cached: no further count queries
    assert_eq!(comments.ensure_comment_count(post_id).await.into_data(), Some(3));
    assert_eq!(comments.ensure_comment_count(post_id).await.into_data(), Some(3));
    assert_eq!(h.store.calls(ops::COMMENT_COUNT), 1);

    // A fresh cache asks exactly once
    let other = h.comments();
    other.ensure_comment_count(post_id).await;
    other.ensure_comment_count(post_id).await;
    assert_eq!(h.store.calls(ops::COMMENT_COUNT), 2);

    assert_eq!(comments.fetch_comment_count(sf(500)).await.into_data(), Some(0));
}
