//! Integration tests for stack-to-history writes
//!
//! Each test performs stack actions through the engine and checks the host
//! path and position once the operation queue has settled.

use super::common::fixtures::{
    active_name, active_param, article, article_step, start, start_with, step, test_config,
};
use navsync::{HistorySync, HostHistory, MemoryHistory, RouteError, SyncError};

/// Test that an unmatched initial path lands on the fallback activity
#[tokio::test(start_paused = true)]
async fn test_fallback_activity_on_unmatched_path() {
    let history = MemoryHistory::new();
    let sync = start(&history).await;

    assert_eq!(history.path(), "/home/");
    assert_eq!(history.index(), 0);
    assert_eq!(active_name(&sync), "Home");
}

/// Test that a matching initial path becomes the root activity
#[tokio::test(start_paused = true)]
async fn test_initial_path_matches_route() {
    let history = MemoryHistory::with_entries(["/articles/123/?title=hello"]);
    let sync = start(&history).await;

    assert_eq!(active_name(&sync), "Article");
    assert_eq!(active_param(&sync, "articleId").as_deref(), Some("123"));
    assert_eq!(active_param(&sync, "title").as_deref(), Some("hello"));
    assert_eq!(history.path(), "/articles/123/?title=hello");
}

/// Test that push writes the filled route with leftover params as query
#[tokio::test(start_paused = true)]
async fn test_push_updates_path() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "1234", "hello")).unwrap();
    sync.settle().await;

    assert_eq!(history.path(), "/articles/1234/?title=hello");
    assert_eq!(history.index(), 1);
    let context_path = sync.active().and_then(|a| a.context.path.clone());
    assert_eq!(context_path.as_deref(), Some("/articles/1234/?title=hello"));
}

/// Test that hash mode keeps the route inside the fragment
#[tokio::test(start_paused = true)]
async fn test_push_with_hash_routing() {
    let history = MemoryHistory::new();
    let mut sync = start_with(&history, test_config().use_hash(true)).await;
    assert_eq!(history.path(), "/#/home/");

    sync.push(article("a1", "1234", "hello")).unwrap();
    sync.settle().await;

    assert_eq!(history.path(), "/#/articles/1234/?title=hello");
}

/// Test that replace overwrites the current entry in place
#[tokio::test(start_paused = true)]
async fn test_replace_updates_path_in_place() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.replace(article("a1", "1234", "hello")).unwrap();
    sync.settle().await;

    assert_eq!(history.path(), "/articles/1234/?title=hello");
    assert_eq!(history.index(), 0);
    assert_eq!(sync.stack().len(), 1);
}

/// Test repeated push and pop keep host position and path aligned
#[tokio::test(start_paused = true)]
async fn test_push_pop_sequence() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    for (n, id) in ["a1", "a2", "a3"].iter().enumerate() {
        let article_id = (n + 1).to_string();
        sync.push(article(id, &article_id, "hello")).unwrap();
        sync.settle().await;
        assert_eq!(history.path(), format!("/articles/{article_id}/?title=hello"));
    }
    assert_eq!(history.index(), 3);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/2/?title=hello");
    assert_eq!(history.index(), 2);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/1/?title=hello");
    assert_eq!(history.index(), 1);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(history.index(), 0);

    assert!(!sync.pop(), "Root activity must not be popped");
    assert!(sync.take_failures().is_empty());
}

/// Test that popping an activity with steps collapses all of its entries
#[tokio::test(start_paused = true)]
async fn test_step_push_then_pop_collapses_entries() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "10", "hello")).unwrap();
    sync.step_push(article_step("s1", "11", "hello")).unwrap();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/11/?title=hello");
    assert_eq!(history.index(), 2);

    sync.step_push(article_step("s2", "12", "hello")).unwrap();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/12/?title=hello");
    assert_eq!(history.index(), 3);

    sync.push(article("a2", "20", "world")).unwrap();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/20/?title=world");
    assert_eq!(history.index(), 4);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/12/?title=hello");
    assert_eq!(history.index(), 3);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(history.index(), 0);
}

/// Test that step pop without explicit steps does nothing
#[tokio::test(start_paused = true)]
async fn test_step_pop_without_steps_is_noop() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "10", "hello")).unwrap();
    sync.step_push(article_step("s1", "11", "hello")).unwrap();
    sync.step_push(article_step("s2", "12", "hello")).unwrap();
    assert!(sync.step_pop());
    assert!(sync.step_pop());
    assert!(!sync.step_pop());
    sync.settle().await;
    assert_eq!(history.path(), "/articles/10/?title=hello");
    assert_eq!(history.index(), 1);

    assert!(!sync.step_pop());
    sync.settle().await;
    assert_eq!(history.index(), 1);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(history.index(), 0);
}

/// Test that step replace overwrites the step's entry
#[tokio::test(start_paused = true)]
async fn test_step_replace_then_pop() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "10", "hello")).unwrap();
    sync.step_push(article_step("s1", "11", "hello")).unwrap();
    sync.step_replace(article_step("s2", "12", "hello")).unwrap();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/12/?title=hello");
    assert_eq!(history.index(), 2);

    sync.step_pop();
    sync.settle().await;
    assert_eq!(history.path(), "/articles/10/?title=hello");
    assert_eq!(history.index(), 1);

    sync.pop();
    sync.settle().await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(history.index(), 0);
}

/// Test that writes wait out the settle delay one at a time
#[tokio::test(start_paused = true)]
async fn test_writes_are_spaced_by_settle_delay() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;
    tokio::time::advance(sync.config().settle_delay).await;

    sync.push(article("a1", "1", "hello")).unwrap();
    sync.push(article("a2", "2", "hello")).unwrap();
    assert_eq!(history.index(), 1, "First write runs immediately");
    assert!(!sync.is_idle());

    tokio::time::advance(sync.config().settle_delay).await;
    sync.pump();
    assert_eq!(history.index(), 2);
    assert!(sync.is_idle());
}

/// Test that pushing an activity without a route fails before mutating
#[tokio::test(start_paused = true)]
async fn test_push_unknown_activity_is_rejected() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    let result = sync.push(navsync::ActivityAction::new("a1", "Nowhere"));
    assert!(matches!(result, Err(navsync::SyncError::Route(_))));
    assert_eq!(sync.stack().len(), 1);
    assert_eq!(history.index(), 0);
}

/// Test that a step whose params cannot fill the route leaves the stack alone
#[tokio::test(start_paused = true)]
async fn test_step_without_route_params_is_rejected() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "10", "hello")).unwrap();
    sync.settle().await;

    let result = sync.step_push(step("s1", "step", "1"));
    assert!(matches!(
        result,
        Err(SyncError::Route(RouteError::MissingParam { .. }))
    ));
    let result = sync.step_replace(step("s2", "step", "2"));
    assert!(matches!(
        result,
        Err(SyncError::Route(RouteError::MissingParam { .. }))
    ));
    assert_eq!(sync.active().unwrap().steps.len(), 1);
    assert_eq!(active_param(&sync, "articleId").as_deref(), Some("10"));

    assert!(!sync.step_pop());
    sync.settle().await;
    assert_eq!(history.path(), "/articles/10/?title=hello");
    assert_eq!(history.index(), 1);
    assert_eq!(active_name(&sync), "Article");
    assert!(sync.take_failures().is_empty());
}

/// Test that our own writes are counted as echoes, not inbound actions
#[tokio::test(start_paused = true)]
async fn test_own_writes_are_not_reconciled() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "1", "hello")).unwrap();
    sync.step_push(article_step("s1", "2", "hello")).unwrap();
    sync.step_pop();
    sync.pop();
    sync.settle().await;

    let stats = sync.stats();
    assert_eq!(stats.inbound_actions, 0);
    assert!(stats.echoes_suppressed >= 5);
    assert_eq!(sync.guard().pending(navsync::sync::EchoKind::Pop), 0);
}

/// Test that startup fails fast on an invalid config
#[test]
fn test_invalid_config_is_rejected() {
    let config = navsync::Config::new("Missing").route("Home", "/home/");
    let result = HistorySync::new(MemoryHistory::new(), config);
    assert!(matches!(result, Err(navsync::SyncError::Config(_))));
}

/// Test that a pop issued mid-queue waits behind earlier writes
#[tokio::test(start_paused = true)]
async fn test_pop_before_writes_land() {
    let mut history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article("a1", "1", "hello")).unwrap();
    sync.push(article("a2", "2", "hello")).unwrap();
    sync.pop();
    sync.settle().await;

    assert_eq!(history.path(), "/articles/1/?title=hello");
    assert_eq!(history.index(), 1);
    assert_eq!(active_param(&sync, "articleId").as_deref(), Some("1"));

    // The popped entry stays available as a forward entry.
    history.forward().unwrap();
    sync.settle().await;
    assert_eq!(active_param(&sync, "articleId").as_deref(), Some("2"));
}
