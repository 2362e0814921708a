use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc, Arc, Barrier,
    },
    thread,
    time::Duration,
};

use keyed_di::{Dependencies, InjectionKey, Lifecycle, ResolutionError};
use rstest::rstest;

#[derive(Debug)]
struct ScreenX {
    tag: usize,
}

const SCREEN_X: InjectionKey<ScreenX> = InjectionKey::new("screen_x");

/// Registers ScreenX with a slow factory, so first resolutions overlap
fn register_slow(deps: &Dependencies, lifecycle: Lifecycle) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let builds = counter.clone();
    deps.register(&SCREEN_X, lifecycle, move |_| {
        let tag = builds.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Ok::<_, Infallible>(ScreenX { tag })
    });
    counter
}

fn provide_concurrently(deps: &Dependencies, callers: usize) -> Vec<Arc<ScreenX>> {
    let barrier = &Barrier::new(callers);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    deps.provide(&SCREEN_X)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect()
    })
}

#[test]
fn three_concurrent_first_resolutions_build_once() {
    let deps = Dependencies::new();
    let counter = register_slow(&deps, Lifecycle::Singleton);

    let screens = provide_concurrently(&deps, 3);

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(screens.len(), 3);
    assert!(screens.iter().all(|screen| Arc::ptr_eq(screen, &screens[0])));
    assert_eq!(screens[0].tag, 0);
}

#[rstest]
#[case(2)]
#[case(16)]
#[case(64)]
fn singleton_is_shared_by_all_racing_callers(#[case] callers: usize) {
    let deps = Dependencies::new();
    let counter = register_slow(&deps, Lifecycle::Singleton);

    let screens = provide_concurrently(&deps, callers);

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(screens.iter().all(|screen| Arc::ptr_eq(screen, &screens[0])));
}

#[test]
fn transient_builds_for_every_racing_caller() {
    let deps = Dependencies::new();
    let counter = register_slow(&deps, Lifecycle::Transient);

    let screens = provide_concurrently(&deps, 8);

    assert_eq!(counter.load(Ordering::SeqCst), 8);
    let mut tags: Vec<_> = screens.iter().map(|screen| screen.tag).collect();
    tags.sort_unstable();
    assert_eq!(tags, (0..8).collect::<Vec<_>>());
}

#[test]
fn slow_factory_does_not_block_other_keys() {
    const FAST: InjectionKey<usize> = InjectionKey::new("fast");

    let deps = Dependencies::new();
    let started = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    {
        let started = started.clone();
        let release = release.clone();
        deps.register(&SCREEN_X, Lifecycle::Singleton, move |_| {
            started.wait();
            release.wait();
            Ok::<_, Infallible>(ScreenX { tag: 0 })
        });
    }
    deps.register(&FAST, Lifecycle::Singleton, |_| Ok::<_, Infallible>(7));

    thread::scope(|scope| {
        let slow = scope.spawn(|| deps.provide(&SCREEN_X));

        // SCREEN_X is now mid build
        started.wait();
        assert_eq!(*deps.provide(&FAST).unwrap(), 7);
        deps.register(&FAST, Lifecycle::Transient, |_| Ok::<_, Infallible>(8));
        assert_eq!(*deps.provide(&FAST).unwrap(), 8);
        release.wait();

        assert_eq!(slow.join().unwrap().unwrap().tag, 0);
    });
}

#[test]
fn racing_failures_leave_the_singleton_retryable() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let deps = Dependencies::new();
    {
        let attempts = attempts.clone();
        deps.register(&SCREEN_X, Lifecycle::Singleton, move |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<ScreenX, _>("not yet")
        });
    }

    let barrier = &Barrier::new(4);
    let deps = &deps;
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    deps.provide(&SCREEN_X)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results
        .iter()
        .all(|result| matches!(result, Err(ResolutionError::FactoryFailed { .. }))));
    // Every caller got a failure of its own attempt
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert!(!deps.is_cached(&SCREEN_X));

    deps.register(&SCREEN_X, Lifecycle::Singleton, |_| {
        Ok::<_, Infallible>(ScreenX { tag: 1 })
    });
    assert_eq!(deps.provide(&SCREEN_X).unwrap().tag, 1);
}

#[test]
fn registering_while_resolving_is_safe() {
    const COUNTER: InjectionKey<usize> = InjectionKey::new("counter");

    let deps = Dependencies::new();
    deps.register(&COUNTER, Lifecycle::Singleton, |_| Ok::<_, Infallible>(0));

    thread::scope(|scope| {
        for n in 1..=4 {
            let deps = &deps;
            scope.spawn(move || {
                for _ in 0..100 {
                    deps.register(&COUNTER, Lifecycle::Singleton, move |_| {
                        Ok::<_, Infallible>(n)
                    });
                }
            });
            scope.spawn(move || {
                for _ in 0..100 {
                    let value = *deps.provide(&COUNTER).unwrap();
                    assert!(value <= 4);
                }
            });
        }
    });

    assert!(deps.is_registered(&COUNTER));
}

#[derive(Debug)]
struct Inbox(#[allow(dead_code)] Arc<Outbox>);
#[derive(Debug)]
struct Outbox(#[allow(dead_code)] Arc<Inbox>);

const INBOX: InjectionKey<Inbox> = InjectionKey::new("inbox");
const OUTBOX: InjectionKey<Outbox> = InjectionKey::new("outbox");

#[test]
fn singleton_cycle_entered_from_both_ends_fails_on_both_threads() {
    let deps = Arc::new(Dependencies::new());
    let both_building = Arc::new(Barrier::new(2));
    {
        // Only the first build of each key meets the other thread
        let first_build = AtomicBool::new(true);
        let both_building = both_building.clone();
        deps.register(&INBOX, Lifecycle::Singleton, move |r| {
            if first_build.swap(false, Ordering::SeqCst) {
                both_building.wait();
            }
            Ok::<_, ResolutionError>(Inbox(r.provide(&OUTBOX)?))
        });
    }
    {
        let first_build = AtomicBool::new(true);
        let both_building = both_building.clone();
        deps.register(&OUTBOX, Lifecycle::Singleton, move |r| {
            if first_build.swap(false, Ordering::SeqCst) {
                both_building.wait();
            }
            Ok::<_, ResolutionError>(Outbox(r.provide(&INBOX)?))
        });
    }

    let (sender, receiver) = mpsc::channel();
    let inbox = {
        let deps = deps.clone();
        let sender = sender.clone();
        thread::spawn(move || sender.send(deps.provide(&INBOX).map(|_| ())).unwrap())
    };
    let outbox = {
        let deps = deps.clone();
        thread::spawn(move || sender.send(deps.provide(&OUTBOX).map(|_| ())).unwrap())
    };

    for _ in 0..2 {
        let result = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("both resolutions return instead of blocking");
        match result.unwrap_err() {
            ResolutionError::CyclicDependency { chain, .. } => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
    inbox.join().unwrap();
    outbox.join().unwrap();

    assert!(!deps.is_cached(&INBOX));
    assert!(!deps.is_cached(&OUTBOX));
}
