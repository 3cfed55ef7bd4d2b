use pacer::pool::WorkerPool;
use pacer::task::{JoinSet, spawn};
use pacer::time::sleep;
use std::future::{Future, poll_fn};
use std::sync::{Arc, Mutex};
use std::task::Poll;
use std::time::Duration;

#[test]
fn test_try_acquire_until_exhausted() {
    let pool = WorkerPool::new(2);

    let a = pool.try_acquire().unwrap();
    let b = pool.try_acquire().unwrap();

    assert_ne!(a.slot(), b.slot());
    assert_eq!(pool.in_use(), 2);
    assert!(pool.try_acquire().is_none());

    drop(a);
    assert_eq!(pool.in_use(), 1);
    assert!(pool.try_acquire().is_some());
}

#[test]
#[should_panic(expected = "pool capacity must be > 0")]
fn test_zero_capacity_panics() {
    let _ = WorkerPool::new(0);
}

#[pacer::test(worker_threads = 4)]
async fn test_capacity_is_never_exceeded() {
    let pool = WorkerPool::new(3);
    let mut set = JoinSet::new();

    for _ in 0..30 {
        let pool = pool.clone();
        set.spawn(async move {
            let _slot = pool.acquire().await;
            let in_use = pool.in_use();
            sleep(Duration::from_millis(5)).await;
            in_use
        });
    }

    let observed = set.join_all().await;

    assert!(observed.iter().all(|c| c.value <= 3));
    assert!(pool.peak_in_use() <= pool.capacity());
    assert_eq!(pool.peak_in_use(), 3);
    assert_eq!(pool.in_use(), 0);
}

#[pacer::test(worker_threads = 4)]
async fn test_waiters_are_served_in_arrival_order() {
    let pool = WorkerPool::new(1);
    let order = Arc::new(Mutex::new(Vec::new()));
    let held = pool.acquire().await;

    let mut handles = Vec::new();
    for i in 0..5 {
        let task_pool = pool.clone();
        let order = order.clone();

        handles.push(spawn(async move {
            let _slot = task_pool.acquire().await;
            order.lock().unwrap().push(i);
        }));

        // Give each waiter time to queue up before the next one.
        while pool.waiting() <= i {
            sleep(Duration::from_millis(1)).await;
        }
    }

    drop(held);
    for handle in handles {
        handle.await;
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[pacer::test]
async fn test_withdrawn_waiter_leaves_the_queue() {
    let pool = WorkerPool::new(1);
    let held = pool.acquire().await;

    let mut waiter = Box::pin(pool.acquire());
    poll_fn(|cx| {
        assert!(waiter.as_mut().poll(cx).is_pending());
        Poll::Ready(())
    })
    .await;
    assert_eq!(pool.waiting(), 1);

    drop(waiter);
    assert_eq!(pool.waiting(), 0);

    drop(held);
    assert_eq!(pool.in_use(), 0);
}

#[pacer::test]
async fn test_slot_handed_to_withdrawn_waiter_is_passed_on() {
    let pool = WorkerPool::new(1);
    let held = pool.acquire().await;

    let mut waiter = Box::pin(pool.acquire());
    poll_fn(|cx| {
        assert!(waiter.as_mut().poll(cx).is_pending());
        Poll::Ready(())
    })
    .await;

    // The slot goes straight to the waiter, so it stays in use.
    drop(held);
    assert_eq!(pool.in_use(), 1);

    drop(waiter);
    assert_eq!(pool.in_use(), 0);
    assert!(pool.try_acquire().is_some());
}
