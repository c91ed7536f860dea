use std::time::{Duration, Instant};

use crate::model::SaveConfig;

/// How soon a scheduled save should fire. Text edits arrive in bursts and
/// get the long window; structural edits settle almost immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveUrgency {
    Text,
    Structural,
}

/// Cooperative debounced save scheduling.
///
/// No threads and no timers: the interactive loop calls `schedule` after a
/// mutation and polls `take_due` each tick. A new edit to the same list
/// cancels and reschedules the pending save rather than stacking requests.
/// Mutations are never blocked behind a save.
#[derive(Debug)]
pub struct SaveScheduler {
    text_window: Duration,
    structural_window: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    list_name: String,
    deadline: Instant,
}

impl SaveScheduler {
    pub fn new(config: &SaveConfig) -> Self {
        SaveScheduler {
            text_window: Duration::from_millis(config.text_debounce_ms),
            structural_window: Duration::from_millis(config.structural_debounce_ms),
            pending: None,
        }
    }

    /// Schedule a save for `list_name`, replacing any pending one.
    pub fn schedule(&mut self, list_name: &str, urgency: SaveUrgency, now: Instant) {
        let window = match urgency {
            SaveUrgency::Text => self.text_window,
            SaveUrgency::Structural => self.structural_window,
        };
        self.pending = Some(Pending {
            list_name: list_name.to_string(),
            deadline: now + window,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The list whose debounce window has elapsed, if any. Taking it clears
    /// the pending slot; a failed save is simply rescheduled by the next
    /// mutation.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            return self.pending.take().map(|p| p.list_name);
        }
        None
    }

    /// Hand back whatever is pending regardless of deadline (shutdown path).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.list_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> SaveScheduler {
        SaveScheduler::new(&SaveConfig::default())
    }

    #[test]
    fn nothing_due_before_the_window() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.schedule("home", SaveUrgency::Text, t0);
        assert_eq!(s.take_due(t0 + Duration::from_millis(100)), None);
        assert!(s.is_pending());
    }

    #[test]
    fn due_after_the_window_elapses() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.schedule("home", SaveUrgency::Text, t0);
        assert_eq!(
            s.take_due(t0 + Duration::from_millis(200)),
            Some("home".to_string())
        );
        assert!(!s.is_pending());
    }

    #[test]
    fn structural_edits_fire_sooner() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.schedule("home", SaveUrgency::Structural, t0);
        assert_eq!(
            s.take_due(t0 + Duration::from_millis(50)),
            Some("home".to_string())
        );
    }

    #[test]
    fn a_new_edit_cancels_and_reschedules() {
        let mut s = scheduler();
        let t0 = Instant::now();
        s.schedule("home", SaveUrgency::Text, t0);
        // Another keystroke 150 ms later pushes the deadline out.
        s.schedule("home", SaveUrgency::Text, t0 + Duration::from_millis(150));
        assert_eq!(s.take_due(t0 + Duration::from_millis(250)), None);
        assert_eq!(
            s.take_due(t0 + Duration::from_millis(350)),
            Some("home".to_string())
        );
    }

    #[test]
    fn flush_returns_pending_immediately() {
        let mut s = scheduler();
        s.schedule("home", SaveUrgency::Text, Instant::now());
        assert_eq!(s.flush(), Some("home".to_string()));
        assert_eq!(s.flush(), None);
    }
}
