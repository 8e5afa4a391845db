use std::time::{Duration, Instant};

/// Handle returned by [`Timers::set_timeout`] / [`Timers::set_interval`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<E> {
    id: TimerId,
    due: Instant,
    period: Option<Duration>,
    event: E,
}

/// Timeouts and intervals serviced from the frame loop. Nothing runs on its
/// own: `poll` hands back whatever came due, and dropping the queue cancels
/// everything still pending.
#[derive(Debug)]
pub struct Timers<E> {
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }
}

impl<E: Clone> Timers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Instant, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, period, event });
        id
    }

    pub fn set_timeout(&mut self, now: Instant, delay: Duration, event: E) -> TimerId {
        self.push(now + delay, None, event)
    }

    /// First fires one `period` after `now`.
    pub fn set_interval(&mut self, now: Instant, period: Duration, event: E) -> TimerId {
        self.push(now + period, Some(period.max(Duration::from_millis(1))), event)
    }

    /// Cancels `id`. Returns false when it already fired or was cleared.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancels every pending timer whose event matches.
    pub fn clear_where(&mut self, mut pred: impl FnMut(&E) -> bool) {
        self.entries.retain(|e| !pred(&e.event));
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every event due at `now`, oldest deadline first.
    /// An interval that fell behind fires once and is rescheduled from `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<E> {
        let mut due: Vec<(Instant, u64, E)> = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.due > now {
                return true;
            }
            due.push((entry.due, entry.id.0, entry.event.clone()));
            match entry.period {
                Some(period) => {
                    entry.due += period;
                    if entry.due <= now {
                        entry.due = now + period;
                    }
                    true
                }
                None => false,
            }
        });
        due.sort_by_key(|(at, id, _)| (*at, *id));
        due.into_iter().map(|(_, _, e)| e).collect()
    }
}
