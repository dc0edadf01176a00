//! Integration tests for replace debt
//!
//! A replace only overwrites the top history entry, so the earlier step
//! entries of the replaced activity stay behind. Popping the replacement has
//! to collapse them too.

use super::common::fixtures::{activity, active_name, article, start, step, Sync};
use navsync::{ActivityAction, MemoryHistory};

fn article_plain(id: &str, article_id: &str) -> ActivityAction {
    activity(id, "Article", "articleId", article_id)
}

fn step_pushes(sync: &mut Sync, key: &str) {
    for (id, value) in [("s2", "2"), ("s3", "3"), ("s4", "4")] {
        sync.step_push(step(id, key, value)).unwrap();
    }
}

async fn pop_and_settle(sync: &mut Sync) {
    assert!(sync.pop());
    sync.settle().await;
}

/// Test that popping a replacement collapses the replaced activity's steps
#[tokio::test(start_paused = true)]
async fn test_replace_after_steps_then_pop() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    step_pushes(&mut sync, "articleId");
    sync.replace(activity("a3", "ThirdActivity", "thirdId", "234"))
        .unwrap();
    sync.settle().await;
    assert_eq!(history.path(), "/third/234/");
    assert_eq!(history.index(), 4);

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(active_name(&sync), "Home");
}

/// Test that the collapse stops at the activity below the replaced one
#[tokio::test(start_paused = true)]
async fn test_replace_stops_at_previous_activity() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    sync.push(activity("a3", "ThirdActivity", "thirdId", "234"))
        .unwrap();
    step_pushes(&mut sync, "thirdId");
    sync.replace(activity("a4", "FourthActivity", "fourthId", "567"))
        .unwrap();
    sync.settle().await;

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/articles/1/");
    assert_eq!(active_name(&sync), "Article");
}

/// Test push and pop between the steps and the replace
#[tokio::test(start_paused = true)]
async fn test_push_pop_then_replace() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    step_pushes(&mut sync, "articleId");
    sync.push(activity("a3", "ThirdActivity", "thirdId", "234"))
        .unwrap();
    sync.pop();
    sync.replace(activity("a4", "FourthActivity", "fourthId", "345"))
        .unwrap();
    sync.settle().await;

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(active_name(&sync), "Home");
}

/// Test that steps pushed after the replace add to the collapse
#[tokio::test(start_paused = true)]
async fn test_steps_after_replace() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    step_pushes(&mut sync, "articleId");
    sync.replace(activity("a4", "FourthActivity", "fourthId", "345"))
        .unwrap();
    for (id, value) in [("s5", "5"), ("s6", "6"), ("s7", "7")] {
        sync.step_push(step(id, "fourthId", value)).unwrap();
    }
    sync.settle().await;
    assert_eq!(history.path(), "/fourth/7/");
    assert_eq!(history.index(), 7);

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(active_name(&sync), "Home");
}

/// Test chained replaces with steps in between carry all debt forward
#[tokio::test(start_paused = true)]
async fn test_chained_replaces() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    step_pushes(&mut sync, "articleId");
    sync.replace(activity("a3", "ThirdActivity", "thirdId", "234"))
        .unwrap();
    step_pushes(&mut sync, "thirdId");
    sync.replace(activity("a4", "FourthActivity", "fourthId", "345"))
        .unwrap();
    sync.settle().await;
    assert_eq!(sync.debt().owed_by(&"a4".into()), 7);

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(active_name(&sync), "Home");
    assert!(sync.debt().is_empty());
}

/// Test that collapsing an activity with steps then replacing below it works
#[tokio::test(start_paused = true)]
async fn test_pop_with_steps_then_replace() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    sync.push(article_plain("a2", "1")).unwrap();
    step_pushes(&mut sync, "articleId");
    sync.push(activity("a3", "ThirdActivity", "thirdId", "234"))
        .unwrap();
    step_pushes(&mut sync, "thirdId");
    sync.pop();
    sync.replace(activity("a4", "FourthActivity", "fourthId", "345"))
        .unwrap();
    sync.settle().await;

    pop_and_settle(&mut sync).await;
    assert_eq!(history.path(), "/home/");
    assert_eq!(active_name(&sync), "Home");
}

/// Test the same cycle twice in a row on one history
#[tokio::test(start_paused = true)]
async fn test_repeated_cycle() {
    let history = MemoryHistory::new();
    let mut sync = start(&history).await;

    let cycles = [
        (("a2", "Article", "articleId"), ("a3", "ThirdActivity", "thirdId"), "a4"),
        (("a5", "ThirdActivity", "thirdId"), ("a6", "FourthActivity", "fourthId"), "a7"),
    ];
    for ((first, first_name, first_key), (second, second_name, second_key), replacement) in cycles
    {
        sync.push(activity(first, first_name, first_key, "1")).unwrap();
        step_pushes(&mut sync, first_key);
        sync.push(activity(second, second_name, second_key, "234"))
            .unwrap();
        step_pushes(&mut sync, second_key);
        sync.pop();
        sync.replace(article(replacement, "345", "hello")).unwrap();
        sync.settle().await;

        pop_and_settle(&mut sync).await;
        assert_eq!(history.path(), "/home/");
        assert_eq!(active_name(&sync), "Home");
        assert_eq!(history.index(), 0);
    }
    assert!(sync.take_failures().is_empty());
}
