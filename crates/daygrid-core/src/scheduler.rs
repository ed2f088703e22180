use std::time::{Duration, Instant};

use tracing::{debug, trace};

pub const DEFAULT_REDRAW_DELAY: Duration = Duration::from_millis(35);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRedraw {
    generation: u64,
    due: Instant,
}

/// Coalesces bursts of navigation into one full redraw. Scheduling while a
/// redraw is pending replaces it; only the newest one ever fires.
#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    delay: Duration,
    generation: u64,
    pending: Option<PendingRedraw>,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REDRAW_DELAY)
    }
}

impl RedrawScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules a redraw `delay` after `now` and returns its generation.
    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        let due = now + self.delay;
        if let Some(superseded) = self.pending.replace(PendingRedraw {
            generation: self.generation,
            due,
        }) {
            debug!(
                superseded = superseded.generation,
                generation = self.generation,
                "superseded pending redraw"
            );
        } else {
            trace!(generation = self.generation, "scheduled redraw");
        }
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.due)
    }

    /// Takes the pending redraw if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some(pending) if pending.due <= now => {
                self.pending = None;
                Some(pending.generation)
            }
            _ => None,
        }
    }

    /// Takes the pending redraw regardless of its deadline.
    pub fn flush(&mut self) -> Option<u64> {
        self.pending.take().map(|pending| pending.generation)
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_into_the_last_schedule() {
        let start = Instant::now();
        let mut scheduler = RedrawScheduler::new(Duration::from_millis(35));

        scheduler.schedule(start);
        scheduler.schedule(start + Duration::from_millis(10));
        let last = scheduler.schedule(start + Duration::from_millis(20));

        assert_eq!(scheduler.poll(start + Duration::from_millis(40)), None);
        assert_eq!(scheduler.poll(start + Duration::from_millis(55)), Some(last));
        assert_eq!(scheduler.poll(start + Duration::from_millis(100)), None);
    }

    #[test]
    fn flush_ignores_deadline() {
        let now = Instant::now();
        let mut scheduler = RedrawScheduler::default();
        let generation = scheduler.schedule(now);
        assert_eq!(scheduler.deadline(), Some(now + DEFAULT_REDRAW_DELAY));
        assert_eq!(scheduler.flush(), Some(generation));
        assert!(!scheduler.is_pending());
        assert!(!scheduler.cancel());
    }
}
