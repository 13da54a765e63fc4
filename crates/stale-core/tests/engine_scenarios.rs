//! Per-item decisions against the in-memory tracker.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use stale_core::{
    is_labeled, ItemOutcome, Mutation, RunConfiguration, RunCounters, SkipReason, StaleProcessor,
};
use stale_tracker::fakes::{MemoryTracker, TrackerCall};
use stale_tracker::{Author, Item, ItemKind, LabelEvent};

const ACTOR: &str = "stale-sweeper";

fn base_config() -> RunConfiguration {
    let mut config = RunConfiguration::default();
    config.issue.stale_message = "This issue has been automatically marked as stale.".to_string();
    config.pull_request.stale_message = "This PR has been automatically marked as stale.".to_string();
    config.issue.stale_label = "Stale".to_string();
    config.pull_request.stale_label = "stale-pr".to_string();
    config.actor = ACTOR.to_string();
    config
}

fn setup(
    now: DateTime<Utc>,
    items: Vec<Item>,
    config: RunConfiguration,
) -> (Arc<MemoryTracker>, StaleProcessor) {
    let tracker = Arc::new(MemoryTracker::new().at(now).with_items(items));
    let processor = StaleProcessor::new(tracker.clone(), config)
        .expect("valid config")
        .with_now(now);
    (tracker, processor)
}

async fn evaluate(processor: &StaleProcessor, item: Item) -> (ItemOutcome, RunCounters) {
    let mut counters = RunCounters::new(100);
    let outcome = processor
        .process_item(&mut counters, item)
        .await
        .expect("evaluation failed");
    (outcome, counters)
}

// ---- Scenario A: old unlabeled item is marked stale ----

#[tokio::test]
async fn old_item_is_marked_stale_and_reevaluated_with_synthetic_timestamp() {
    let now = Utc::now();
    let item = Item::new(1, "crash on startup", now - Duration::days(100));
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(outcome.marked_stale);
    assert!(!outcome.closed);
    assert!(!outcome.unstaled);
    assert_eq!(counters.staled().len(), 1);
    assert_eq!(counters.staled()[0].updated_at, now - Duration::days(60));
    assert!(is_labeled(&counters.staled()[0], "stale"));
    // 2 for label + comment, 1 for the label timeline read in the same pass.
    assert_eq!(counters.operations_left(), 97);
    assert_eq!(
        tracker.mutations(),
        vec![
            (
                1,
                Mutation::AddComment(
                    "This issue has been automatically marked as stale.".to_string()
                )
            ),
            (1, Mutation::AddLabel("Stale".to_string())),
        ]
    );
    assert!(tracker
        .calls()
        .iter()
        .any(|c| matches!(c, TrackerCall::FetchLabelEvents { number: 1 })));
}

#[tokio::test]
async fn pull_requests_use_their_own_label_and_message() {
    let now = Utc::now();
    let item = Item::new(2, "wip", now - Duration::days(90)).with_kind(ItemKind::PullRequest);
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());

    let (outcome, _) = evaluate(&processor, item).await;

    assert!(outcome.marked_stale);
    assert_eq!(
        tracker.mutations()[1],
        (2, Mutation::AddLabel("stale-pr".to_string()))
    );
}

// ---- Scenario B: human comment after the stale label ----

#[tokio::test]
async fn human_comment_keeps_item_open_and_removes_label() {
    let now = Utc::now();
    let item = Item::new(3, "feature request", now - Duration::days(2)).with_labels(&["Stale"]);
    let config = RunConfiguration {
        days_before_close: 7.0,
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);
    tracker.add_label_event(3, LabelEvent::labeled("Stale", now - Duration::days(10)));
    tracker.add_comment(3, Author::user("octocat"), now - Duration::days(2));

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(!outcome.marked_stale);
    assert!(outcome.unstaled);
    assert!(!outcome.closed);
    assert_eq!(counters.unstaled().len(), 1);
    assert!(!is_labeled(&counters.unstaled()[0], "Stale"));
    assert!(counters.closed().is_empty());
    assert_eq!(
        tracker.mutations(),
        vec![(3, Mutation::RemoveLabel("Stale".to_string()))]
    );
    assert!(tracker.calls().iter().any(|c| matches!(
        c,
        TrackerCall::FetchComments { number: 3, since } if *since == now - Duration::days(10)
    )));
}

#[tokio::test]
async fn human_comment_without_unstale_toggle_leaves_label() {
    let now = Utc::now();
    let item = Item::new(4, "question", now - Duration::days(2)).with_labels(&["stale"]);
    let config = RunConfiguration {
        remove_stale_when_updated: false,
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);
    tracker.add_label_event(4, LabelEvent::labeled("stale", now - Duration::days(10)));
    tracker.add_comment(4, Author::user("octocat"), now - Duration::days(2));

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(!outcome.unstaled);
    assert!(!outcome.closed);
    assert!(tracker.mutations().is_empty());
    assert_eq!(counters.operations_left(), 99);
}

#[tokio::test]
async fn label_removal_uses_the_items_own_casing() {
    let now = Utc::now();
    let item = Item::new(5, "docs", now - Duration::days(1)).with_labels(&["STALE"]);
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());
    tracker.add_comment(5, Author::user("maintainer"), now - Duration::hours(1));

    let (outcome, _) = evaluate(&processor, item).await;

    assert!(outcome.unstaled);
    assert_eq!(
        tracker.mutations(),
        vec![(5, Mutation::RemoveLabel("STALE".to_string()))]
    );
}

// ---- Scenario C: no activity past the close window ----

#[tokio::test]
async fn inactive_stale_item_is_closed() {
    let now = Utc::now();
    let item = Item::new(6, "abandoned", now - Duration::days(10)).with_labels(&["Stale"]);
    // Close window is days_before_close + days_before_stale = 8 days.
    let config = RunConfiguration {
        days_before_stale: 1.0,
        days_before_close: 7.0,
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);
    tracker.add_label_event(6, LabelEvent::labeled("Stale", now - Duration::days(10)));

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(outcome.closed);
    assert!(!outcome.marked_stale);
    assert_eq!(counters.closed().len(), 1);
    assert!(!counters.closed()[0].is_open());
    assert_eq!(tracker.mutations(), vec![(6, Mutation::Close)]);
    assert_eq!(counters.operations_left(), 98);
    assert!(!tracker.item(6).unwrap().is_open());
}

#[tokio::test]
async fn close_message_is_posted_before_closing() {
    let now = Utc::now();
    let item = Item::new(7, "abandoned", now - Duration::days(30)).with_labels(&["Stale"]);
    let mut config = RunConfiguration {
        days_before_stale: 10.0,
        days_before_close: 5.0,
        ..base_config()
    };
    config.issue.close_message = "Closing due to inactivity.".to_string();
    let (tracker, processor) = setup(now, vec![item.clone()], config);

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(outcome.closed);
    assert_eq!(
        tracker.mutations(),
        vec![
            (7, Mutation::AddComment("Closing due to inactivity.".to_string())),
            (7, Mutation::Close),
        ]
    );
    // The close comment shares the close unit.
    assert_eq!(counters.operations_left(), 98);
}

#[tokio::test]
async fn bot_and_actor_comments_do_not_prevent_closing() {
    let now = Utc::now();
    let item = Item::new(8, "stale", now - Duration::days(20)).with_labels(&["Stale"]);
    let config = RunConfiguration {
        days_before_stale: 5.0,
        days_before_close: 5.0,
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);
    tracker.add_label_event(8, LabelEvent::labeled("Stale", now - Duration::days(15)));
    tracker.add_comment(8, Author::bot("renovate[bot]"), now - Duration::days(3));
    tracker.add_comment(8, Author::user(ACTOR), now - Duration::days(3));

    let (outcome, _) = evaluate(&processor, item).await;

    assert!(outcome.closed);
}

#[tokio::test]
async fn recent_update_keeps_stale_item_open() {
    let now = Utc::now();
    let item = Item::new(9, "slow burn", now - Duration::days(3)).with_labels(&["Stale"]);
    let config = RunConfiguration {
        days_before_stale: 0.0,
        days_before_close: 7.0,
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);

    let (outcome, _) = evaluate(&processor, item).await;

    assert!(!outcome.closed);
    assert!(tracker.mutations().is_empty());
}

#[tokio::test]
async fn freshly_staled_item_is_never_closed_in_the_same_pass() {
    let now = Utc::now();
    let item = Item::new(10, "ancient", now - Duration::days(3650));
    let config = RunConfiguration {
        days_before_stale: 0.0,
        days_before_close: 0.0,
        ..base_config()
    };
    let (_, processor) = setup(now, vec![item.clone()], config);

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(outcome.marked_stale);
    assert!(!outcome.closed);
    assert!(counters.closed().is_empty());
}

// ---- Scenario D: label filter with closing disabled ----

#[tokio::test]
async fn negative_close_days_never_close() {
    let now = Utc::now();
    let item = Item::new(11, "ancient", now - Duration::days(400)).with_labels(&["Stale"]);
    let config = RunConfiguration {
        days_before_close: -1.0,
        only_labels: Some("needs-info".to_string()),
        ..base_config()
    };
    let (tracker, processor) = setup(now, vec![item.clone()], config);

    let (outcome, counters) = evaluate(&processor, item).await;

    assert!(!outcome.closed);
    assert!(tracker.mutations().is_empty());
    // The label timeline is still consulted.
    assert_eq!(counters.operations_left(), 99);
}

// ---- Skips ----

#[tokio::test]
async fn exempt_labels_match_case_and_accent_insensitively() {
    let now = Utc::now();
    let mut config = base_config();
    config.issue.exempt_labels = "pinned, Sécurité".to_string();
    let items = vec![
        Item::new(20, "a", now - Duration::days(100)).with_labels(&["PINNED"]),
        Item::new(21, "b", now - Duration::days(100)).with_labels(&["securite", "Stale"]),
    ];
    let (tracker, processor) = setup(now, items.clone(), config);

    for item in items {
        let (outcome, counters) = evaluate(&processor, item).await;
        assert!(matches!(outcome.skipped, Some(SkipReason::Exempt(_))));
        assert_eq!(counters.operations_left(), 100);
    }
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn exempt_list_of_one_kind_does_not_apply_to_the_other() {
    let now = Utc::now();
    let mut config = base_config();
    config.pull_request.exempt_labels = "pinned".to_string();
    let item = Item::new(22, "a", now - Duration::days(100)).with_labels(&["pinned"]);
    let (_, processor) = setup(now, vec![item.clone()], config);

    let (outcome, _) = evaluate(&processor, item).await;

    assert_eq!(outcome.skipped, None);
    assert!(outcome.marked_stale);
}

#[tokio::test]
async fn empty_message_locked_and_closed_items_are_skipped() {
    let now = Utc::now();
    let mut config = base_config();
    config.pull_request.stale_message.clear();
    let old = now - Duration::days(100);
    let (tracker, processor) = setup(now, vec![], config);

    let cases = [
        (
            Item::new(30, "pr", old).with_kind(ItemKind::PullRequest),
            SkipReason::EmptyStaleMessage,
        ),
        (Item::new(31, "locked", old).locked(), SkipReason::Locked),
        (Item::new(32, "closed", old).closed(), SkipReason::Closed),
    ];
    for (item, reason) in cases {
        let (outcome, counters) = evaluate(&processor, item).await;
        assert_eq!(outcome.skipped, Some(reason));
        assert_eq!(counters.operations_left(), 100);
    }
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn recently_updated_items_are_not_staled() {
    let now = Utc::now();
    let item = Item::new(40, "active", now - Duration::days(59));
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());

    let (outcome, counters) = evaluate(&processor, item).await;

    assert_eq!(outcome, ItemOutcome::default());
    assert_eq!(counters.operations_left(), 100);
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn negative_stale_days_disable_marking_but_still_close() {
    let now = Utc::now();
    let config = RunConfiguration {
        days_before_stale: -1.0,
        days_before_close: 7.0,
        ..base_config()
    };
    let unlabeled = Item::new(41, "old", now - Duration::days(100));
    let labeled = Item::new(42, "old", now - Duration::days(100)).with_labels(&["Stale"]);
    let (tracker, processor) = setup(now, vec![unlabeled.clone(), labeled.clone()], config);

    let (outcome, _) = evaluate(&processor, unlabeled).await;
    assert_eq!(outcome, ItemOutcome::default());

    let (outcome, _) = evaluate(&processor, labeled).await;
    assert!(outcome.closed);
    assert_eq!(tracker.mutations(), vec![(42, Mutation::Close)]);
}

// ---- Idempotence ----

#[tokio::test]
async fn second_pass_does_not_restale() {
    let now = Utc::now();
    let item = Item::new(50, "old", now - Duration::days(100));
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());

    let (first, _) = evaluate(&processor, item).await;
    assert!(first.marked_stale);
    let after_first = tracker.mutations().len();

    let refreshed = tracker.item(50).expect("item still tracked");
    let (second, _) = evaluate(&processor, refreshed).await;

    assert!(!second.marked_stale);
    assert!(!second.closed);
    assert_eq!(tracker.mutations().len(), after_first);
}

// ---- Errors ----

#[tokio::test]
async fn tracker_failure_aborts_evaluation() {
    let now = Utc::now();
    let item = Item::new(60, "old", now - Duration::days(100));
    let (tracker, processor) = setup(now, vec![item.clone()], base_config());
    tracker.fail_on(stale_tracker::fakes::CallKind::Mutate);

    let mut counters = RunCounters::new(10);
    let err = processor
        .process_item(&mut counters, item)
        .await
        .unwrap_err();

    assert!(matches!(err, stale_core::StaleError::Tracker(_)));
    // Charged on the attempt.
    assert_eq!(counters.operations_left(), 8);
}
