//! Deadline slots for the shell's debounce and poll timers.
//!
//! There is no background timer thread. Each kind of timer owns one slot
//! holding its next deadline and a token; scheduling a kind again replaces
//! the slot, so an older timer of the same kind can never fire. The owner
//! drives the slots by calling [`Timers::pop_due`] from its event loop.

use std::time::{Duration, Instant};

/// The timers the visibility state machine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Settles hover movement over the tray before checking the cursor.
    HoverDebounce,
    /// Repeating check that hides a peeking window once the cursor leaves.
    FocusPoll,
    /// Re-enables hover once the user stops resizing.
    ResizeSettle,
}

impl TimerKind {
    const ALL: [TimerKind; 3] = [
        TimerKind::HoverDebounce,
        TimerKind::FocusPoll,
        TimerKind::ResizeSettle,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::HoverDebounce => 0,
            TimerKind::FocusPoll => 1,
            TimerKind::ResizeSettle => 2,
        }
    }
}

/// Identity of one scheduled timer. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TimerToken,
    deadline: Instant,
    interval: Option<Duration>,
}

/// One slot per [`TimerKind`].
#[derive(Debug, Default)]
pub struct Timers {
    next_token: u64,
    slots: [Option<Pending>; 3],
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer, superseding any pending timer of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, deadline: Instant) -> TimerToken {
        self.arm(kind, deadline, None)
    }

    /// Schedule a timer that re-arms itself every `interval` after firing
    /// until it is cancelled.
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        first: Instant,
        interval: Duration,
    ) -> TimerToken {
        self.arm(kind, first, Some(interval))
    }

    fn arm(&mut self, kind: TimerKind, deadline: Instant, interval: Option<Duration>) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.slots[kind.slot()] = Some(Pending {
            token,
            deadline,
            interval,
        });
        token
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.slots[kind.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; 3];
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    /// Token of the pending timer of this kind, if any.
    pub fn token(&self, kind: TimerKind) -> Option<TimerToken> {
        self.slots[kind.slot()].map(|p| p.token)
    }

    /// Earliest pending deadline, for scheduling the next wake-up.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|p| p.deadline).min()
    }

    /// Take the earliest timer whose deadline has passed.
    ///
    /// One-shot timers are removed from their slot. Repeating timers are
    /// re-armed one interval after `now` with the same token; the caller
    /// stops them with [`Timers::cancel`].
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerKind, TimerToken)> {
        let kind = TimerKind::ALL
            .into_iter()
            .filter_map(|kind| {
                self.slots[kind.slot()]
                    .filter(|p| p.deadline <= now)
                    .map(|p| (kind, p.deadline))
            })
            .min_by_key(|(_, deadline)| *deadline)
            .map(|(kind, _)| kind)?;

        let slot = &mut self.slots[kind.slot()];
        let pending = (*slot)?;
        *slot = pending.interval.map(|interval| Pending {
            deadline: now + interval,
            ..pending
        });

        Some((kind, pending.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rescheduling_supersedes_older_timer() {
        let start = Instant::now();
        let mut timers = Timers::new();

        let first = timers.schedule(TimerKind::ResizeSettle, start + ms(600));
        let second = timers.schedule(TimerKind::ResizeSettle, start + ms(900));
        assert!(second > first);

        assert_eq!(timers.pop_due(start + ms(700)), None);
        assert_eq!(
            timers.pop_due(start + ms(900)),
            Some((TimerKind::ResizeSettle, second))
        );
        assert!(!timers.is_pending(TimerKind::ResizeSettle));
    }

    #[test]
    fn test_due_timers_fire_in_deadline_order() {
        let start = Instant::now();
        let mut timers = Timers::new();

        timers.schedule(TimerKind::ResizeSettle, start + ms(50));
        timers.schedule(TimerKind::HoverDebounce, start + ms(10));

        let now = start + ms(100);
        assert_eq!(timers.pop_due(now).map(|(k, _)| k), Some(TimerKind::HoverDebounce));
        assert_eq!(timers.pop_due(now).map(|(k, _)| k), Some(TimerKind::ResizeSettle));
        assert_eq!(timers.pop_due(now), None);
    }

    #[test]
    fn test_repeating_timer_rearms_until_cancelled() {
        let start = Instant::now();
        let mut timers = Timers::new();

        let token = timers.schedule_repeating(TimerKind::FocusPoll, start + ms(110), ms(110));

        assert_eq!(
            timers.pop_due(start + ms(110)),
            Some((TimerKind::FocusPoll, token))
        );
        assert_eq!(timers.next_deadline(), Some(start + ms(220)));
        assert_eq!(timers.token(TimerKind::FocusPoll), Some(token));

        timers.cancel(TimerKind::FocusPoll);
        assert_eq!(timers.pop_due(start + ms(500)), None);
    }

    #[test]
    fn test_cancel_all_clears_every_slot() {
        let start = Instant::now();
        let mut timers = Timers::new();
        timers.schedule(TimerKind::HoverDebounce, start);
        timers.schedule_repeating(TimerKind::FocusPoll, start, ms(110));
        timers.schedule(TimerKind::ResizeSettle, start);

        timers.cancel_all();
        assert_eq!(timers.next_deadline(), None);
        assert_eq!(timers.pop_due(start + ms(1000)), None);
    }
}
