use pacer::task::spawn;
use pacer::time::{instrumented, sleep};
use std::thread;
use std::time::{Duration, Instant};

#[pacer::test]
async fn test_sleep_basic() {
    let start = Instant::now();
    sleep(Duration::from_millis(50)).await;

    assert!(
        start.elapsed() >= Duration::from_millis(50),
        "Sleep should wait at least the specified duration"
    );
}

#[pacer::test]
async fn test_sleep_zero_duration() {
    let start = Instant::now();
    sleep(Duration::ZERO).await;

    assert!(
        start.elapsed() < Duration::from_millis(10),
        "Zero duration sleep should be fast"
    );
}

#[test]
fn test_deadline_is_fixed_at_creation() {
    let before = Instant::now();
    let sleep = sleep(Duration::from_millis(50));
    let after = Instant::now();

    thread::sleep(Duration::from_millis(20));

    assert!(sleep.deadline() >= before + Duration::from_millis(50));
    assert!(sleep.deadline() <= after + Duration::from_millis(50));
}

#[pacer::test]
async fn test_elapsed_deadline_completes_immediately() {
    let sleep = sleep(Duration::from_millis(20));
    thread::sleep(Duration::from_millis(30));

    let (_, elapsed) = instrumented(sleep).await;

    assert!(elapsed < Duration::from_millis(10));
}

#[pacer::test(worker_threads = 2)]
async fn test_concurrent_sleeps_overlap() {
    let start = Instant::now();

    let handles: Vec<_> = (0..100)
        .map(|_| spawn(async { sleep(Duration::from_millis(100)).await }))
        .collect();

    for handle in handles {
        handle.await;
    }

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(
        elapsed < Duration::from_millis(1000),
        "100 sleeps of 100ms should overlap, took {elapsed:?}"
    );
}

#[pacer::test]
async fn test_dropped_sleep_does_not_disturb_others() {
    drop(sleep(Duration::from_millis(10)));

    let (_, elapsed) = instrumented(sleep(Duration::from_millis(30))).await;

    assert!(elapsed >= Duration::from_millis(30));
}

#[pacer::test]
async fn test_instrumented_measures_the_future() {
    let (value, elapsed) = instrumented(async {
        sleep(Duration::from_millis(50)).await;
        "done"
    })
    .await;

    assert_eq!(value, "done");
    assert!(
        elapsed >= Duration::from_millis(50),
        "Time wrapper should measure at least the sleep duration"
    );
}
