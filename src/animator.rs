//! Slide transitions between step panels.
//!
//! Each panel moves through `Hidden -> Entering -> Active -> Exiting -> Hidden`.
//! A transition puts the outgoing panel in `Exiting` and the incoming one in
//! `Entering`, each tagged with a slide variant picked from the direction.
//! Completion arrives either as a per-panel end signal from the renderer or,
//! with the timed strategy, once a fixed delay has elapsed. When both ends are
//! done the incoming panel is the only `Active` one.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Navigation direction; selects the slide variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Visibility state of a single panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Hidden,
    Entering,
    Active,
    Exiting,
}

/// Slide animation applied to a panel while it is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideVariant {
    InFromRight,
    InFromLeft,
    OutToLeft,
    OutToRight,
}

/// How the end of an animation is detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStrategy {
    /// Wait for the renderer to report each panel's slide as finished
    #[default]
    Signal,
    /// Finish both panels once the animation duration has elapsed
    Timed,
}

impl Direction {
    pub fn exit_variant(self) -> SlideVariant {
        match self {
            Direction::Forward => SlideVariant::OutToLeft,
            Direction::Backward => SlideVariant::OutToRight,
        }
    }

    pub fn entry_variant(self) -> SlideVariant {
        match self {
            Direction::Forward => SlideVariant::InFromRight,
            Direction::Backward => SlideVariant::InFromLeft,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Panel {
    state: PanelState,
    variant: Option<SlideVariant>,
}

/// Bookkeeping for the transition currently in flight
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    started: Instant,
    exit_done: bool,
    entry_done: bool,
}

/// Applies slide variants to panels and tracks their completion
#[derive(Debug)]
pub struct Animator {
    panels: Vec<Panel>,
    in_flight: Option<Transition>,
    strategy: CompletionStrategy,
    duration: Duration,
}

impl Animator {
    /// Create an animator with `initial` active and every other panel hidden
    pub fn new(
        total: usize,
        initial: usize,
        strategy: CompletionStrategy,
        duration: Duration,
    ) -> Self {
        let panels = (0..total)
            .map(|i| Panel {
                state: if i == initial {
                    PanelState::Active
                } else {
                    PanelState::Hidden
                },
                variant: None,
            })
            .collect();
        Self {
            panels,
            in_flight: None,
            strategy,
            duration,
        }
    }

    /// Start sliding `from` out and `to` in. Returns false when a transition is
    /// already running or the indices are unusable.
    pub fn begin(&mut self, from: usize, to: usize, direction: Direction, now: Instant) -> bool {
        if self.in_flight.is_some()
            || from == to
            || from >= self.panels.len()
            || to >= self.panels.len()
        {
            return false;
        }

        self.panels[from] = Panel {
            state: PanelState::Exiting,
            variant: Some(direction.exit_variant()),
        };
        self.panels[to] = Panel {
            state: PanelState::Entering,
            variant: Some(direction.entry_variant()),
        };
        self.in_flight = Some(Transition {
            from,
            to,
            direction,
            started: now,
            exit_done: false,
            entry_done: false,
        });
        true
    }

    /// A panel reported the end of its slide. Signals for panels that are not
    /// in flight are ignored. Returns true when this completes the transition.
    pub fn signal_end(&mut self, panel: usize) -> bool {
        let Some(mut t) = self.in_flight else {
            return false;
        };

        if panel == t.from && !t.exit_done {
            t.exit_done = true;
            self.panels[panel] = Panel {
                state: PanelState::Hidden,
                variant: None,
            };
        } else if panel == t.to && !t.entry_done {
            t.entry_done = true;
            self.panels[panel] = Panel {
                state: PanelState::Active,
                variant: None,
            };
        } else {
            return false;
        }

        if t.exit_done && t.entry_done {
            self.in_flight = None;
            true
        } else {
            self.in_flight = Some(t);
            false
        }
    }

    /// Timed strategy: finish both panels once the delay has passed.
    /// Returns true when the transition completed on this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.strategy != CompletionStrategy::Timed {
            return false;
        }
        let Some(t) = self.in_flight else {
            return false;
        };
        if now.saturating_duration_since(t.started) < self.duration {
            return false;
        }
        let exited = self.signal_end(t.from);
        exited || self.signal_end(t.to)
    }

    /// Panels whose slide has visually finished but not yet been signalled
    pub fn finished_panels(&self, now: Instant) -> Vec<usize> {
        let Some(t) = self.in_flight else {
            return Vec::new();
        };
        if self.progress(now) < 1.0 {
            return Vec::new();
        }
        let mut done = Vec::new();
        if !t.exit_done {
            done.push(t.from);
        }
        if !t.entry_done {
            done.push(t.to);
        }
        done
    }

    /// Fraction of the slide elapsed, in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        let Some(t) = self.in_flight else {
            return 1.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(t.started).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Horizontal offset in columns for drawing a panel `width` wide
    pub fn slide_offset(&self, panel: usize, now: Instant, width: u16) -> i32 {
        let Some(p) = self.panels.get(panel) else {
            return 0;
        };
        let progress = self.progress(now);
        let width = f32::from(width);
        let offset = match p.variant {
            Some(SlideVariant::InFromRight) => width * (1.0 - progress),
            Some(SlideVariant::InFromLeft) => -width * (1.0 - progress),
            Some(SlideVariant::OutToLeft) => -width * progress,
            Some(SlideVariant::OutToRight) => width * progress,
            None => 0.0,
        };
        offset.round() as i32
    }

    pub fn state(&self, panel: usize) -> Option<PanelState> {
        self.panels.get(panel).map(|p| p.state)
    }

    pub fn variant(&self, panel: usize) -> Option<SlideVariant> {
        self.panels.get(panel).and_then(|p| p.variant)
    }

    /// Panels that are not hidden, in index order
    pub fn visible_panels(&self) -> Vec<usize> {
        self.panels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state != PanelState::Hidden)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| p.state == PanelState::Active)
            .count()
    }

    pub fn in_flight(&self) -> Option<&Transition> {
        self.in_flight.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn strategy(&self) -> CompletionStrategy {
        self.strategy
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator(strategy: CompletionStrategy) -> Animator {
        Animator::new(3, 0, strategy, Duration::from_millis(300))
    }

    #[test]
    fn test_initial_states() {
        let a = animator(CompletionStrategy::Signal);
        assert_eq!(a.state(0), Some(PanelState::Active));
        assert_eq!(a.state(1), Some(PanelState::Hidden));
        assert_eq!(a.active_count(), 1);
        assert!(!a.is_running());
    }

    #[test]
    fn test_forward_variants() {
        let mut a = animator(CompletionStrategy::Signal);
        assert!(a.begin(0, 1, Direction::Forward, Instant::now()));
        assert_eq!(a.state(0), Some(PanelState::Exiting));
        assert_eq!(a.variant(0), Some(SlideVariant::OutToLeft));
        assert_eq!(a.state(1), Some(PanelState::Entering));
        assert_eq!(a.variant(1), Some(SlideVariant::InFromRight));
        assert_eq!(a.active_count(), 0);
    }

    #[test]
    fn test_backward_variants() {
        let mut a = Animator::new(3, 2, CompletionStrategy::Signal, Duration::ZERO);
        assert!(a.begin(2, 1, Direction::Backward, Instant::now()));
        assert_eq!(a.variant(2), Some(SlideVariant::OutToRight));
        assert_eq!(a.variant(1), Some(SlideVariant::InFromLeft));
    }

    #[test]
    fn test_signals_complete_in_any_order() {
        let mut a = animator(CompletionStrategy::Signal);
        a.begin(0, 1, Direction::Forward, Instant::now());

        assert!(!a.signal_end(1));
        assert_eq!(a.state(1), Some(PanelState::Active));
        assert!(a.is_running());

        assert!(a.signal_end(0));
        assert_eq!(a.state(0), Some(PanelState::Hidden));
        assert_eq!(a.visible_panels(), vec![1]);
        assert!(!a.is_running());
    }

    #[test]
    fn test_stale_and_duplicate_signals_ignored() {
        let mut a = animator(CompletionStrategy::Signal);
        assert!(!a.signal_end(0));

        a.begin(0, 1, Direction::Forward, Instant::now());
        assert!(!a.signal_end(2));
        assert!(!a.signal_end(0));
        assert!(!a.signal_end(0));
        assert!(a.is_running());
    }

    #[test]
    fn test_begin_refused_while_running() {
        let mut a = animator(CompletionStrategy::Signal);
        let now = Instant::now();
        assert!(a.begin(0, 1, Direction::Forward, now));
        assert!(!a.begin(1, 2, Direction::Forward, now));
        assert_eq!(a.state(2), Some(PanelState::Hidden));
    }

    #[test]
    fn test_begin_rejects_bad_indices() {
        let mut a = animator(CompletionStrategy::Signal);
        let now = Instant::now();
        assert!(!a.begin(0, 0, Direction::Forward, now));
        assert!(!a.begin(0, 3, Direction::Forward, now));
    }

    #[test]
    fn test_timed_completion_after_delay() {
        let mut a = animator(CompletionStrategy::Timed);
        let start = Instant::now();
        a.begin(0, 1, Direction::Forward, start);

        assert!(!a.tick(start + Duration::from_millis(100)));
        assert!(a.is_running());

        assert!(a.tick(start + Duration::from_millis(300)));
        assert_eq!(a.state(1), Some(PanelState::Active));
        assert_eq!(a.state(0), Some(PanelState::Hidden));
        assert_eq!(a.active_count(), 1);
    }

    #[test]
    fn test_tick_ignored_for_signal_strategy() {
        let mut a = animator(CompletionStrategy::Signal);
        let start = Instant::now();
        a.begin(0, 1, Direction::Forward, start);
        assert!(!a.tick(start + Duration::from_secs(5)));
        assert!(a.is_running());
    }

    #[test]
    fn test_finished_panels_after_duration() {
        let mut a = animator(CompletionStrategy::Signal);
        let start = Instant::now();
        a.begin(0, 1, Direction::Forward, start);
        assert!(a.finished_panels(start).is_empty());
        assert_eq!(
            a.finished_panels(start + Duration::from_millis(400)),
            vec![0, 1]
        );
    }

    #[test]
    fn test_slide_offsets() {
        let mut a = animator(CompletionStrategy::Signal);
        let start = Instant::now();
        a.begin(0, 1, Direction::Forward, start);

        assert_eq!(a.slide_offset(1, start, 40), 40);
        assert_eq!(a.slide_offset(0, start, 40), 0);

        let end = start + Duration::from_millis(300);
        assert_eq!(a.slide_offset(1, end, 40), 0);
        assert_eq!(a.slide_offset(0, end, 40), -40);
        assert_eq!(a.slide_offset(2, end, 40), 0);
    }
}
