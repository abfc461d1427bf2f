use std::time::Duration;

use subjunctive_core::ConfigError;
use subjunctive_system_scheduler::{Clock, ManualClock, Scheduler, Timing};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[derive(Debug, Default)]
struct Counter {
    hits: Vec<&'static str>,
}

#[test]
fn one_shot_fires_once_after_its_delay() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler
        .call_with(
            |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("once"),
            Some("500ms"),
            None,
        )
        .expect("valid timing");

    assert_eq!(scheduler.update(ms(0), &mut counter), 0);
    assert_eq!(scheduler.update(ms(499), &mut counter), 0);
    assert_eq!(scheduler.update(ms(500), &mut counter), 1);
    assert_eq!(scheduler.update(ms(5_000), &mut counter), 0);
    assert_eq!(counter.hits, vec!["once"]);
    assert!(scheduler.is_empty());
}

#[test]
fn one_shot_delay_counts_from_registration_not_promotion() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler
        .call_with(
            |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("once"),
            Some("500ms"),
            None,
        )
        .expect("valid timing");

    assert_eq!(scheduler.update(ms(400), &mut counter), 0);
    assert_eq!(scheduler.update(ms(600), &mut counter), 1);
    assert_eq!(scheduler.update(ms(900), &mut counter), 0);
    assert_eq!(counter.hits, vec!["once"]);
    assert!(scheduler.is_empty());
}

#[test]
fn delay_registered_inside_a_callback_counts_from_that_update() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler.call(
        |_: &mut Counter, scheduler: &mut Scheduler<Counter>| {
            let _ = scheduler.call(
                |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("follow-up"),
                Timing::after(ms(100)),
            );
        },
        Timing::after(ms(1_000)),
    );

    assert_eq!(scheduler.update(ms(1_000), &mut counter), 1);
    assert_eq!(scheduler.update(ms(1_099), &mut counter), 0);
    assert_eq!(scheduler.update(ms(1_100), &mut counter), 1);
    assert_eq!(counter.hits, vec!["follow-up"]);
}

#[test]
fn periodic_task_fires_on_promotion_and_rearms_from_now() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler.call(
        |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("tick"),
        Timing::every(ms(100)),
    );

    assert_eq!(scheduler.update(ms(10), &mut counter), 1);
    assert_eq!(scheduler.update(ms(109), &mut counter), 0);
    assert_eq!(scheduler.update(ms(250), &mut counter), 1);
    // Re-armed at 250 + 100, not at the missed 210.
    assert_eq!(scheduler.update(ms(349), &mut counter), 0);
    assert_eq!(scheduler.update(ms(350), &mut counter), 1);
    assert_eq!(counter.hits.len(), 3);
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn tasks_registered_during_update_wait_for_the_next_one() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler.call(
        |counter: &mut Counter, scheduler: &mut Scheduler<Counter>| {
            counter.hits.push("parent");
            let _ = scheduler.call(
                |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("child"),
                Timing::after(Duration::ZERO),
            );
        },
        Timing::after(Duration::ZERO),
    );

    assert_eq!(scheduler.update(ms(0), &mut counter), 1);
    assert_eq!(counter.hits, vec!["parent"]);
    assert_eq!(scheduler.update(ms(0), &mut counter), 1);
    assert_eq!(counter.hits, vec!["parent", "child"]);
}

#[test]
fn due_tasks_fire_in_registration_order() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let _ = scheduler.call(
        |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("late delay"),
        Timing::after(ms(50)),
    );
    let _ = scheduler.call(
        |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("short delay"),
        Timing::after(ms(10)),
    );

    let _ = scheduler.update(ms(0), &mut counter);
    assert_eq!(scheduler.update(ms(60), &mut counter), 2);
    assert_eq!(counter.hits, vec!["late delay", "short delay"]);
}

#[test]
fn invalid_timing_is_rejected_at_registration() {
    let mut scheduler: Scheduler<Counter> = Scheduler::new();
    let noop = |_: &mut Counter, _: &mut Scheduler<Counter>| {};

    assert_eq!(
        scheduler.call_with(noop, None, None),
        Err(ConfigError::MissingTiming)
    );
    assert_eq!(
        scheduler.call_with(noop, Some("1s"), Some("1s")),
        Err(ConfigError::ConflictingTiming)
    );
    assert_eq!(
        scheduler.call_with(noop, Some("soon"), None),
        Err(ConfigError::InvalidTimespec("soon".to_owned()))
    );
    assert!(scheduler.is_empty());
}

#[test]
fn periodic_task_can_be_cancelled_from_another_task() {
    let mut scheduler = Scheduler::new();
    let mut counter = Counter::default();
    let id = scheduler.call(
        |counter: &mut Counter, _: &mut Scheduler<Counter>| counter.hits.push("tick"),
        Timing::every(ms(10)),
    );
    let _ = scheduler.call(
        move |_: &mut Counter, scheduler: &mut Scheduler<Counter>| {
            let _ = scheduler.cancel(id);
        },
        Timing::after(ms(15)),
    );

    let mut clock = ManualClock::default();
    for _ in 0..5 {
        let _ = scheduler.update_with_clock(&clock, &mut counter);
        clock.advance(ms(10));
    }
    assert_eq!(clock.now(), ms(50));
    assert_eq!(counter.hits.len(), 3, "fires at 0, 10 and 20 ahead of the cancel at 20");
    assert!(scheduler.is_empty());
}
