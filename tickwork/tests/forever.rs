use tickwork::{Completer, Driver, Error, Resume, Scheduler, Step, Suspension, Yield, routine};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("watchdog tripped")]
struct WatchdogTripped;

#[test]
fn test_clean_exit_is_reported_as_cancellation() {
    let mut forever = Driver::forever(
        Completer::new(),
        routine::from_iter((0..4).map(|_| Yield::NotYet)),
    );
    let promise = forever.promise();

    let succeeded = Arc::new(AtomicBool::new(false));
    let flag = succeeded.clone();
    promise.on_success(move |_| flag.store(true, Ordering::SeqCst));

    for _ in 0..4 {
        assert!(!forever.step().is_done());
        assert!(!promise.is_done(), "Forever task is pending while looping");
    }
    assert!(forever.step().is_done());

    assert!(promise.failed());
    assert!(!promise.succeeded());
    assert!(matches!(promise.error(), Some(Error::LoopCancelled)));
    assert!(!succeeded.load(Ordering::SeqCst), "Success callback never runs");
    assert!(forever.is_finished());
    assert!(forever.step().is_done());
}

#[test]
fn test_returning_unit_is_also_cancellation() {
    let mut forever = Driver::forever(
        Completer::new(),
        routine::from_iter([Yield::NotYet, Yield::Return(())]),
    );
    let promise = forever.promise();

    assert!(!forever.step().is_done());
    assert!(forever.step().is_done());
    assert!(matches!(promise.error(), Some(Error::LoopCancelled)));
}

#[test]
fn test_inner_fault_is_forwarded_unchanged() {
    let fault = Error::routine(WatchdogTripped);
    let expected = fault.clone();
    let mut fault = Some(fault);
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let mut forever = Driver::forever(
        Completer::new(),
        routine::from_fn::<(), _>(move || {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(Resume::Yielded(Yield::NotYet))
            } else {
                Err(fault.take().unwrap_or(Error::NoReason))
            }
        }),
    );
    let promise = forever.promise();

    while !forever.step().is_done() {}

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(promise.error().unwrap().same_fault(&expected));
    assert!(forever.inner().promise().failed());
}

#[test]
fn test_looping_task_never_completes() {
    let mut scheduler = Scheduler::builder().max_ticks(50).build();

    let (promise, handle) =
        scheduler.spawn_forever(routine::from_fn::<(), _>(|| Ok(Resume::Yielded(Yield::NotYet))));

    let result = scheduler.run_until_idle();

    assert!(matches!(result, Err(Error::Stalled { ticks: 50 })));
    assert!(!promise.is_done());
    assert!(!handle.is_finished());
    assert_eq!(scheduler.active(), 1);
}

#[test]
fn test_cancellation_reaches_error_callback() {
    let mut scheduler = Scheduler::new();
    let cancellations = Arc::new(AtomicUsize::new(0));

    let (promise, _) = scheduler.spawn_forever(routine::from_iter([Yield::NotYet]));

    let counter = cancellations.clone();
    promise.on_error(move |error| {
        if matches!(error, Error::LoopCancelled) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert_eq!(scheduler.run_until_idle().unwrap(), 2);
    assert_eq!(cancellations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_forever_exposes_the_inner_suspension() {
    let signal = Suspension::ticks(2);
    let mut forever = Driver::forever(
        Completer::new(),
        routine::from_iter([Yield::Suspend(signal.clone()), Yield::NotYet]),
    );

    assert!(forever.suspension().is_none());

    assert!(!forever.step().is_done());
    assert!(forever.suspension().is_some_and(|s| s.same(&signal)));
    assert!(forever.inner().suspension().is_some_and(|s| s.same(&signal)));

    assert!(!forever.step().is_done());
    assert!(forever.suspension().is_none(), "NotYet parks on nothing");

    assert!(forever.step().is_done());
    assert!(forever.suspension().is_none());
    assert!(matches!(forever.promise().error(), Some(Error::LoopCancelled)));
}
