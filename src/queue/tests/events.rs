//! Lifecycle event fan-out tests.

use super::*;

#[tokio::test]
async fn test_scoped_feed_sees_only_its_job_type() {
    let (store, queue) = setup().await;
    let runs = Arc::new(AtomicUsize::new(0));
    queue.register_handler("alpha", counting_handler(&runs));
    queue.register_handler("beta", counting_handler(&runs));
    let mut scoped = queue.subscribe_job_type("alpha");

    queue.enqueue("alpha", "1").await.unwrap();
    queue.enqueue("beta", "2").await.unwrap();

    wait_for("both jobs complete", || {
        store.is_empty() && queue.in_progress() == 0
    })
    .await;

    let events = collect_events(&mut scoped, Duration::from_millis(100)).await;
    assert!(!events.is_empty());
    for event in &events {
        assert_eq!(event.job_type(), Some("alpha"));
    }
    assert_eq!(count_starts(&events), 1);
    assert_eq!(count_dones(&events), 1);
}

#[tokio::test]
async fn test_global_feed_sees_everything() {
    let (store, queue) = setup().await;
    let runs = Arc::new(AtomicUsize::new(0));
    queue.register_handler("alpha", counting_handler(&runs));
    queue.register_handler("beta", counting_handler(&runs));
    let mut events = queue.subscribe();

    queue.enqueue("alpha", "1").await.unwrap();
    queue.enqueue("beta", "2").await.unwrap();

    wait_for("both jobs complete", || {
        store.is_empty() && queue.in_progress() == 0
    })
    .await;

    let events = collect_events(&mut events, Duration::from_millis(100)).await;
    assert_eq!(count_starts(&events), 2);
    assert_eq!(count_dones(&events), 2);
    assert_eq!(
        count_drains(&events),
        1,
        "drain only when the counter returns to zero"
    );
}

#[tokio::test]
async fn test_drain_fires_per_idle_transition() {
    let (store, queue) = setup().await;
    let runs = Arc::new(AtomicUsize::new(0));
    queue.register_handler("work", counting_handler(&runs));
    let mut events = queue.subscribe();

    queue.enqueue("work", "first").await.unwrap();
    wait_for("first batch drains", || {
        store.is_empty() && queue.in_progress() == 0
    })
    .await;

    queue.enqueue("work", "second").await.unwrap();
    wait_for("second batch drains", || {
        store.is_empty() && queue.in_progress() == 0
    })
    .await;

    let events = collect_events(&mut events, Duration::from_millis(100)).await;
    assert_eq!(count_drains(&events), 2, "one drain per return to idle");
}
