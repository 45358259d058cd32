//! Deadline queue standing in for the host's interval/timeout callbacks
//!
//! Each kind has at most one live deadline. Rescheduling replaces it and
//! cancelling removes it, so a cancelled timer can never fire late.

/// Delayed actions owned by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One countdown step; reschedules itself while the match is live
    Countdown,
    /// Debounce window of a single click closed
    SingleClick,
    /// Caught target reappears
    Respawn,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    /// Sorted by deadline, ties in scheduling order
    deadlines: Vec<(f64, TimerKind)>,
}

impl TimerQueue {
    pub fn schedule(&mut self, kind: TimerKind, due_ms: f64) {
        self.cancel(kind);
        let idx = self.deadlines.partition_point(|(due, _)| *due <= due_ms);
        self.deadlines.insert(idx, (due_ms, kind));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines.retain(|(_, k)| *k != kind);
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.deadline(kind).is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<f64> {
        self.deadlines
            .iter()
            .find(|(_, k)| *k == kind)
            .map(|(due, _)| *due)
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(f64, TimerKind)> {
        match self.deadlines.first() {
            Some((due, _)) if *due <= now_ms => Some(self.deadlines.remove(0)),
            _ => None,
        }
    }
}
