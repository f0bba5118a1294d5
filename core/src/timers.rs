//! Deterministic timer queue that stands in for delayed cycles.

use std::collections::BTreeMap;
use std::time::Duration;

/// Converts a configured number of seconds into a timer delay.
///
/// NaN and non-positive values mean no delay. Values too large for a
/// [`Duration`], infinity included, saturate to [`Duration::MAX`].
#[must_use]
pub fn delay_from_secs(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

/// Handle returned when scheduling a timer, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    expiry: Duration,
    sequence: u64,
}

impl TimerHandle {
    /// Simulated time at which the timer fires.
    #[must_use]
    pub const fn expiry(&self) -> Duration {
        self.expiry
    }
}

/// Timer removed from the queue because its expiry was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiredTimer<K> {
    /// Simulated time at which the timer was due.
    pub expiry: Duration,
    /// Payload registered with the timer.
    pub key: K,
}

/// Ordered set of pending timers keyed by expiry.
///
/// The queue owns a monotonic clock advanced by [`TimerQueue::advance`].
/// Timers sharing an expiry fire in the order they were scheduled.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    now: Duration,
    next_sequence: u64,
    entries: BTreeMap<(Duration, u64), K>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Current simulated time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedules `key` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, key: K) -> TimerHandle {
        let expiry = self.now.saturating_add(delay);
        self.schedule_at(expiry, key)
    }

    /// Schedules `key` to fire at an absolute simulated time.
    ///
    /// Expiries in the past fire on the next poll.
    pub fn schedule_at(&mut self, expiry: Duration, key: K) -> TimerHandle {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let _ = self.entries.insert((expiry, sequence), key);
        TimerHandle { expiry, sequence }
    }

    /// Removes a pending timer, returning its payload.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<K> {
        self.entries.remove(&(handle.expiry, handle.sequence))
    }

    /// Reports whether the timer is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries
            .contains_key(&(handle.expiry, handle.sequence))
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Pops the earliest timer whose expiry is not after the current time.
    pub fn pop_expired(&mut self) -> Option<ExpiredTimer<K>> {
        let (&(expiry, _), _) = self.entries.first_key_value()?;
        if expiry > self.now {
            return None;
        }

        let ((expiry, _), key) = self.entries.pop_first()?;
        Some(ExpiredTimer { expiry, key })
    }

    /// Drops every pending timer and rewinds the clock.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.now = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Cycle {
        Spawn,
        Regen,
        Advance,
    }

    fn drain(queue: &mut TimerQueue<Cycle>) -> Vec<Cycle> {
        let mut fired = Vec::new();
        while let Some(expired) = queue.pop_expired() {
            fired.push(expired.key);
        }
        fired
    }

    #[test]
    fn timers_fire_only_after_expiry() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(Duration::from_millis(500), Cycle::Spawn);

        queue.advance(Duration::from_millis(499));
        assert!(drain(&mut queue).is_empty());

        queue.advance(Duration::from_millis(1));
        assert_eq!(drain(&mut queue), vec![Cycle::Spawn]);
        assert!(queue.is_empty());
    }

    #[test]
    fn timers_fire_in_expiry_then_schedule_order() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(Duration::from_secs(2), Cycle::Advance);
        let _ = queue.schedule(Duration::from_secs(1), Cycle::Regen);
        let _ = queue.schedule(Duration::from_secs(1), Cycle::Spawn);

        queue.advance(Duration::from_secs(5));
        assert_eq!(
            drain(&mut queue),
            vec![Cycle::Regen, Cycle::Spawn, Cycle::Advance]
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let regen = queue.schedule(Duration::from_secs(4), Cycle::Regen);
        assert!(queue.is_pending(regen));

        assert_eq!(queue.cancel(regen), Some(Cycle::Regen));
        assert!(!queue.is_pending(regen));
        assert_eq!(queue.cancel(regen), None);

        queue.advance(Duration::from_secs(10));
        assert!(drain(&mut queue).is_empty());
    }

    #[test]
    fn rescheduling_from_expiry_catches_up_within_one_poll() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(Duration::ZERO, Cycle::Spawn);
        queue.advance(Duration::from_millis(2_500));

        let mut fired = 0;
        while let Some(expired) = queue.pop_expired() {
            fired += 1;
            let next = expired.expiry + Duration::from_secs(1);
            let _ = queue.schedule_at(next, expired.key);
        }

        assert_eq!(fired, 3);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn configured_delays_never_overflow() {
        assert_eq!(delay_from_secs(1.5), Duration::from_millis(1_500));
        assert_eq!(delay_from_secs(-2.0), Duration::ZERO);
        assert_eq!(delay_from_secs(f32::NAN), Duration::ZERO);
        assert_eq!(delay_from_secs(f32::INFINITY), Duration::MAX);
        assert_eq!(delay_from_secs(1e30), Duration::MAX);

        let mut queue = TimerQueue::new();
        queue.advance(Duration::from_secs(3));
        let handle = queue.schedule(delay_from_secs(f32::INFINITY), Cycle::Regen);
        assert_eq!(handle.expiry(), Duration::MAX);
        queue.advance(Duration::from_secs(3_600));
        assert!(drain(&mut queue).is_empty());
    }

    #[test]
    fn reset_rewinds_clock_and_drops_timers() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(Duration::from_secs(1), Cycle::Spawn);
        queue.advance(Duration::from_secs(3));
        queue.reset();

        assert_eq!(queue.now(), Duration::ZERO);
        assert!(queue.is_empty());
    }
}
