use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jogdeck_reactive::{ReactiveError, Runtime};

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

#[test]
fn effect_runs_immediately_and_on_write() {
    let runtime = Runtime::new();
    let value = runtime.signal(1);
    let runs = counter();
    let seen = Rc::new(Cell::new(0));

    let _effect = runtime
        .effect({
            let (value, runs, seen) = (value.clone(), runs.clone(), seen.clone());
            move || {
                runs.set(runs.get() + 1);
                seen.set(value.get());
            }
        })
        .unwrap();

    assert_eq!(runs.get(), 1);
    value.set(7).unwrap();
    assert_eq!(runs.get(), 2);
    assert_eq!(seen.get(), 7);
}

#[test]
fn dependencies_follow_the_last_run() {
    let runtime = Runtime::new();
    let use_a = runtime.signal(true);
    let a = runtime.signal(1);
    let b = runtime.signal(2);
    let runs = counter();

    let _effect = runtime
        .effect({
            let (use_a, a, b, runs) = (use_a.clone(), a.clone(), b.clone(), runs.clone());
            move || {
                runs.set(runs.get() + 1);
                if use_a.get() {
                    let _ = a.get();
                } else {
                    let _ = b.get();
                }
            }
        })
        .unwrap();

    b.set(3).unwrap();
    assert_eq!(runs.get(), 1, "b was not read yet");

    use_a.set(false).unwrap();
    assert_eq!(runs.get(), 2);

    a.set(10).unwrap();
    assert_eq!(runs.get(), 2, "a is no longer a dependency");

    b.set(4).unwrap();
    assert_eq!(runs.get(), 3);
}

#[test]
fn untracked_reads_do_not_subscribe() {
    let runtime = Runtime::new();
    let tracked = runtime.signal(0);
    let untracked = runtime.signal(0);
    let runs = counter();

    let _effect = runtime
        .effect({
            let (tracked, untracked, runs) = (tracked.clone(), untracked.clone(), runs.clone());
            move || {
                runs.set(runs.get() + 1);
                let _ = tracked.get();
                let _ = untracked.get_untracked();
            }
        })
        .unwrap();

    untracked.set(1).unwrap();
    assert_eq!(runs.get(), 1);
    tracked.set(1).unwrap();
    assert_eq!(runs.get(), 2);
}

#[test]
fn runtime_untrack_returns_the_closure_value() {
    let runtime = Runtime::new();
    let source = runtime.signal(5);

    assert!(!runtime.is_tracking());
    assert_eq!(runtime.untrack(|| source.get() * 2), 10);
}

#[test]
fn memo_recomputes_and_notifies_readers() {
    let runtime = Runtime::new();
    let base = runtime.signal(2);
    let computes = counter();

    let squared = runtime
        .memo({
            let (base, computes) = (base.clone(), computes.clone());
            move || {
                computes.set(computes.get() + 1);
                base.get() * base.get()
            }
        })
        .unwrap();

    let plus_one = runtime
        .memo({
            let squared = squared.clone();
            move || squared.get() + 1
        })
        .unwrap();

    assert_eq!(squared.get(), 4);
    assert_eq!(plus_one.get(), 5);

    base.set(3).unwrap();
    assert_eq!(squared.get(), 9);
    assert_eq!(plus_one.get(), 10);
    assert_eq!(computes.get(), 2);

    squared.dispose();
    base.set(4).unwrap();
    assert_eq!(squared.get(), 9, "disposed memo keeps its last value");
}

#[test]
fn write_notifies_every_subscriber() {
    let runtime = Runtime::new();
    let value = runtime.signal(0);
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut effects = Vec::new();
    for name in ["first", "second"] {
        effects.push(
            runtime
                .effect({
                    let (value, order) = (value.clone(), order.clone());
                    move || order.borrow_mut().push((name, value.get()))
                })
                .unwrap(),
        );
    }

    value.set(1).unwrap();
    assert_eq!(
        *order.borrow(),
        vec![("first", 0), ("second", 0), ("first", 1), ("second", 1)]
    );
}

#[test]
fn disposed_effect_stops_running() {
    let runtime = Runtime::new();
    let value = runtime.signal(0);
    let runs = counter();

    let effect = runtime
        .effect({
            let (value, runs) = (value.clone(), runs.clone());
            move || {
                let _ = value.get();
                runs.set(runs.get() + 1);
            }
        })
        .unwrap();

    assert!(effect.is_active());
    effect.dispose();
    assert!(!effect.is_active());

    value.set(1).unwrap();
    assert_eq!(runs.get(), 1);
}

#[test]
fn bounded_self_write_settles_below_the_limit() {
    let runtime = Runtime::with_max_depth(8);
    let n = runtime.signal(0);

    let _effect = runtime
        .effect({
            let n = n.clone();
            move || {
                let current = n.get();
                if current < 5 {
                    let _ = n.set(current + 1);
                }
            }
        })
        .unwrap();

    assert_eq!(n.get_untracked(), 5);

    n.set(0).unwrap();
    assert_eq!(n.get_untracked(), 5, "effect is still subscribed after recursion");
}

#[test]
fn unbounded_self_write_fails_fast() {
    let runtime = Runtime::with_max_depth(8);
    let n = runtime.signal(0u32);

    let result = runtime.effect({
        let n = n.clone();
        move || {
            let current = n.get();
            let _ = n.set(current + 1);
        }
    });

    match result {
        Err(ReactiveError::RecursionLimit { limit, depth }) => {
            assert_eq!(limit, 8);
            assert!(depth > limit);
        }
        other => panic!("expected recursion limit, got {:?}", other),
    }
    assert_eq!(n.get_untracked(), 8);

    // The failing effect was disposed, so the graph is usable again.
    n.set(0).unwrap();
    assert_eq!(n.get_untracked(), 0);
}

#[test]
fn cycle_between_effects_is_reported_to_the_outer_writer() {
    let runtime = Runtime::with_max_depth(16);
    let ping = runtime.signal(0u32);
    let pong = runtime.signal(0u32);

    let _forward = runtime
        .effect({
            let (ping, pong) = (ping.clone(), pong.clone());
            move || {
                let value = ping.get();
                let _ = pong.set(value + 1);
            }
        })
        .unwrap();

    // Pong -> ping closes the loop only once this effect exists.
    let _backward = runtime
        .effect({
            let (ping, pong) = (ping.clone(), pong.clone());
            move || {
                let value = pong.get();
                if value > 1 {
                    let _ = ping.set(value + 1);
                }
            }
        })
        .unwrap();

    let err = ping.set(100).unwrap_err();
    assert!(matches!(err, ReactiveError::RecursionLimit { limit: 16, .. }));

    // The latch is cleared once reported.
    let other = runtime.signal(0);
    other.set(1).unwrap();
}

#[test]
fn split_handles_share_the_value() {
    let runtime = Runtime::new();
    let (read, write) = runtime.signal(String::from("a")).split();

    write.update(|value| value.push('b')).unwrap();
    assert_eq!(read.get(), "ab");
    assert_eq!(read.with(|value| value.len()), 2);
}

#[test]
fn writes_after_runtime_drop_report_disposed() {
    let runtime = Runtime::new();
    let value = runtime.signal(1);
    drop(runtime);

    assert_eq!(value.set(2), Err(ReactiveError::Disposed));
    assert_eq!(value.get(), 2);
}

#[test]
fn update_can_read_the_signal_it_updates() {
    let runtime = Runtime::new();
    let value = runtime.signal(3);
    let reader = value.clone();

    value.update(|next| *next += reader.get_untracked()).unwrap();
    assert_eq!(value.get(), 6);
}

#[test]
fn write_inside_with_is_refused() {
    let runtime = Runtime::new();
    let value = runtime.signal(1);

    let result = value.with(|_| value.set(5));
    assert_eq!(result, Err(ReactiveError::Borrowed));
    assert_eq!(value.get(), 1);
}
