use pacer::task::JoinSet;
use pacer::time::sleep;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[pacer::test]
async fn joinset_empty() {
    let mut set: JoinSet<()> = JoinSet::new();

    assert!(set.is_empty());
    assert!(set.join_next().await.is_none());
}

#[pacer::test]
async fn joinset_yields_in_completion_order() {
    let mut set = JoinSet::new();

    set.spawn(async move {
        sleep(Duration::from_millis(200)).await;
        "slow"
    });
    set.spawn(async move {
        sleep(Duration::from_millis(10)).await;
        "fast"
    });

    let first = set.join_next().await.unwrap();
    assert_eq!(first.value, "fast");
    assert_eq!(first.order, 0);

    let second = set.join_next().await.unwrap();
    assert_eq!(second.value, "slow");
    assert_eq!(second.order, 1);

    assert!(set.join_next().await.is_none());
}

#[pacer::test(worker_threads = 4)]
async fn joinset_join_all_ranks_are_contiguous() {
    let mut set = JoinSet::new();

    for i in 0..50u64 {
        set.spawn(async move {
            sleep(Duration::from_millis(i % 7)).await;
            i
        });
    }
    assert_eq!(set.len(), 50);

    let completed = set.join_all().await;

    let orders: Vec<_> = completed.iter().map(|c| c.order).collect();
    assert_eq!(orders, (0..50).collect::<Vec<_>>());

    let mut values: Vec<_> = completed.into_iter().map(|c| c.value).collect();
    values.sort_unstable();
    assert_eq!(values, (0..50).collect::<Vec<_>>());
    assert!(set.is_empty());
}

#[pacer::test]
async fn joinset_detach_leaves_tasks_running() {
    let finished = Arc::new(AtomicUsize::new(0));
    let mut set = JoinSet::new();

    for _ in 0..3 {
        let finished = finished.clone();
        set.spawn(async move {
            sleep(Duration::from_millis(30)).await;
            finished.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(set.detach(), 3);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}
