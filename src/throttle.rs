use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::timer::Scheduler;

pub const DEFAULT_THROTTLE_MS: u32 = 100;

/// A callback wrapped so that bursts of calls collapse into one trailing
/// execution, `wait_ms` after the last call of the burst, with that call's
/// arguments.
pub struct Throttled<A, S: Scheduler> {
    inner: Rc<ThrottleInner<A, S>>,
}

struct ThrottleInner<A, S: Scheduler> {
    scheduler: S,
    wait_ms: u32,
    pending: RefCell<Option<S::Handle>>,
    callback: RefCell<Box<dyn FnMut(A)>>,
}

impl<A, S: Scheduler> Clone for Throttled<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub fn throttle<A, S, F>(scheduler: S, wait_ms: u32, callback: F) -> Throttled<A, S>
where
    A: 'static,
    S: Scheduler + 'static,
    F: FnMut(A) + 'static,
{
    Throttled {
        inner: Rc::new(ThrottleInner {
            scheduler,
            wait_ms,
            pending: RefCell::new(None),
            callback: RefCell::new(Box::new(callback)),
        }),
    }
}

impl<A: 'static, S: Scheduler + 'static> Throttled<A, S> {
    pub fn call(&self, args: A) {
        self.cancel();

        let weak: Weak<ThrottleInner<A, S>> = Rc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule(
            self.inner.wait_ms,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner.pending.borrow_mut().take();
                (&mut *inner.callback.borrow_mut())(args);
            }),
        );

        *self.inner.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(handle) = pending {
            self.inner.scheduler.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::timer::manual::ManualScheduler;

    type Calls = Rc<RefCell<Vec<(u64, u32)>>>;

    fn recording(scheduler: &ManualScheduler) -> (Throttled<u32, ManualScheduler>, Calls) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let throttled = {
            let calls = calls.clone();
            let clock = scheduler.clone();
            throttle(scheduler.clone(), DEFAULT_THROTTLE_MS, move |value| {
                calls.borrow_mut().push((clock.now_ms(), value));
            })
        };
        (throttled, calls)
    }

    #[test]
    fn burst_collapses_to_one_trailing_call_with_latest_args() {
        let scheduler = ManualScheduler::default();
        let (throttled, calls) = recording(&scheduler);

        for value in 1..=5 {
            throttled.call(value);
            scheduler.advance(20);
        }
        assert!(calls.borrow().is_empty());

        scheduler.advance(100);
        assert_eq!(*calls.borrow(), vec![(180, 5)]);
        assert!(!throttled.is_pending());
    }

    #[test]
    fn calls_separated_by_quiet_periods_each_fire() {
        let scheduler = ManualScheduler::default();
        let (throttled, calls) = recording(&scheduler);

        throttled.call(1);
        scheduler.advance(150);
        throttled.call(2);
        scheduler.advance(150);

        assert_eq!(*calls.borrow(), vec![(100, 1), (250, 2)]);
    }

    #[test]
    fn only_one_timer_is_outstanding() {
        let scheduler = ManualScheduler::default();
        let (throttled, _calls) = recording(&scheduler);

        for value in 0..50 {
            throttled.call(value);
        }

        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn superseded_calls_release_their_arguments() {
        let scheduler = ManualScheduler::default();
        let throttled = throttle(scheduler.clone(), DEFAULT_THROTTLE_MS, |_: Rc<()>| {});
        let offset = Rc::new(());

        for _ in 0..40 {
            throttled.call(offset.clone());
        }
        // Only the latest call's arguments are still held.
        assert_eq!(Rc::strong_count(&offset), 2);

        scheduler.advance(DEFAULT_THROTTLE_MS.into());
        assert_eq!(Rc::strong_count(&offset), 1);
    }

    #[test]
    fn cancel_drops_pending_execution() {
        let scheduler = ManualScheduler::default();
        let (throttled, calls) = recording(&scheduler);

        throttled.call(7);
        throttled.cancel();
        scheduler.advance(1_000);

        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn callback_may_reschedule_itself() {
        let scheduler = ManualScheduler::default();
        let slot: Rc<RefCell<Option<Throttled<u32, ManualScheduler>>>> =
            Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let throttled = {
            let slot = slot.clone();
            let seen = seen.clone();
            throttle(scheduler.clone(), 10, move |value: u32| {
                seen.borrow_mut().push(value);
                if value < 3 {
                    if let Some(again) = slot.borrow().as_ref() {
                        again.call(value + 1);
                    }
                }
            })
        };
        *slot.borrow_mut() = Some(throttled.clone());

        throttled.call(1);
        scheduler.advance(100);

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }
}
