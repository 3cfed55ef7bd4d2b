use pacer::RuntimeBuilder;
use pacer::pool::WorkerPool;
use pacer::task::spawn;
use pacer::time::sleep;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_single_worker_thread() {
    let rt = RuntimeBuilder::new().worker_threads(1).build().unwrap();

    assert_eq!(rt.worker_threads(), 1);
    assert_eq!(rt.block_on(async { 42 }), 42);
}

#[test]
fn test_worker_threads_parallel_execution() {
    let rt = RuntimeBuilder::new().worker_threads(4).build().unwrap();

    let results = Arc::new(Mutex::new(Vec::new()));
    let results_clone = results.clone();

    let doubled = rt.block_on(async move {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let results = results_clone.clone();

                spawn(async move {
                    results.lock().unwrap().push(i);
                    i * 2
                })
            })
            .collect();

        let mut doubled = Vec::new();
        for handle in handles {
            doubled.push(handle.await);
        }
        doubled
    });

    let mut seen = results.lock().unwrap().clone();
    seen.sort_unstable();

    assert_eq!(seen, (0..10).collect::<Vec<_>>());
    assert_eq!(doubled, (0..10).map(|i| i * 2).collect::<Vec<_>>());
}

#[test]
fn test_worker_threads_chain_spawn() {
    let rt = RuntimeBuilder::new().worker_threads(4).build().unwrap();

    let result = rt.block_on(async {
        let handle1 = spawn(async {
            let handle2 = spawn(async {
                let handle3 = spawn(async { 10 });
                handle3.await + 20
            });
            handle2.await + 30
        });
        handle1.await + 40
    });

    assert_eq!(result, 100);
}

#[test]
fn test_blocked_workers_do_not_stall_the_rest() {
    let rt = RuntimeBuilder::new().worker_threads(3).build().unwrap();

    let elapsed = rt.block_on(async {
        let blockers: Vec<_> = (0..2)
            .map(|_| spawn(async { thread::sleep(Duration::from_millis(300)) }))
            .collect();

        // Let the blockers get picked up by the other workers.
        thread::yield_now();

        let start = Instant::now();
        let quick = spawn(async { 7 });
        assert_eq!(quick.await, 7);
        let elapsed = start.elapsed();

        for blocker in blockers {
            blocker.await;
        }

        elapsed
    });

    assert!(
        elapsed < Duration::from_millis(300),
        "a free worker should run new tasks while others block, took {elapsed:?}"
    );
}

#[test]
fn test_dropped_handle_still_runs() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    rt.block_on(async move {
        let _ = spawn(async move {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
    });

    let deadline = Instant::now() + Duration::from_secs(2);
    while counter.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
#[should_panic(expected = "worker_threads must be > 0")]
fn test_worker_threads_zero_panics() {
    let _ = RuntimeBuilder::new().worker_threads(0).build();
}

#[test]
fn test_worker_threads_sequential_runtimes() {
    for n in 1..=4 {
        let rt = RuntimeBuilder::new().worker_threads(n).build().unwrap();
        let result = rt.block_on(async move { n * 10 });
        assert_eq!(result, n * 10);
        drop(rt);
    }
}

#[test]
fn test_drop_releases_tasks_waiting_for_a_slot() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();
    let pool = WorkerPool::new(1);
    let owned = Arc::new(());
    let weak = Arc::downgrade(&owned);

    let held = {
        let pool = pool.clone();

        rt.block_on(async move {
            let held = pool.acquire().await;

            let waiter = pool.clone();
            let _ = spawn(async move {
                let _owned = owned;
                let _slot = waiter.acquire().await;
            });

            while pool.waiting() == 0 {
                sleep(Duration::from_millis(1)).await;
            }

            held
        })
    };

    assert!(weak.upgrade().is_some());
    assert_eq!(pool.waiting(), 1);

    drop(rt);

    assert!(weak.upgrade().is_none());
    assert_eq!(pool.waiting(), 0);
    assert_eq!(pool.in_use(), 1);

    drop(held);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn test_drop_releases_tasks_suspended_on_a_timer() {
    let rt = RuntimeBuilder::new().worker_threads(2).build().unwrap();
    let owned = Arc::new(());
    let weak = Arc::downgrade(&owned);

    rt.block_on(async move {
        let _ = spawn(async move {
            let _owned = owned;
            sleep(Duration::from_secs(60)).await;
        });

        sleep(Duration::from_millis(20)).await;
    });

    assert!(weak.upgrade().is_some());

    drop(rt);

    assert!(weak.upgrade().is_none());
}

#[pacer::test(worker_threads = 2)]
async fn test_attribute_runs_on_a_runtime() {
    let handle = spawn(async { "spawned" });

    assert_eq!(handle.await, "spawned");
}
