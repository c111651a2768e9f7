//! Step navigation state machine.
//!
//! One `Navigator` is built per form instance. It owns the current step, the
//! transition lock, the navigation controls and the progress dots, and it
//! gates forward movement on the [`Validator`]. Any request that arrives
//! while a transition is running is dropped, never queued.

use std::time::{Duration, Instant};

use crate::animator::{Animator, CompletionStrategy, Direction};
use crate::form::{AnswerSheet, FormSchema};
use crate::validator::Validator;

/// Core navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorState {
    pub current_step: usize,
    pub is_animating: bool,
    pub total_steps: usize,
}

/// Visibility of the navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub previous: bool,
    pub next: bool,
    pub submit: bool,
}

/// Style of one progress marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Completed,
    Active,
    Inactive,
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved one step forward
    Advanced,
    /// Moved one step back
    Retreated,
    /// Last step validated; answers may be handed to the submit handler
    Submitted,
    /// Validation failed; errors are on the board
    Invalid,
    /// Dropped: locked, out of range, or not applicable
    Ignored,
}

/// Tunables for a navigator
#[derive(Debug, Clone, Copy)]
pub struct NavigatorOptions {
    pub strategy: CompletionStrategy,
    pub animation: Duration,
    /// Rows added to the active step height when sizing the container
    pub padding: u16,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            strategy: CompletionStrategy::Signal,
            animation: Duration::from_millis(300),
            padding: 4,
        }
    }
}

pub struct Navigator {
    form: FormSchema,
    state: NavigatorState,
    animator: Animator,
    validator: Validator,
    controls: Controls,
    progress: Vec<DotState>,
    container_height: u16,
    padding: u16,
}

impl Navigator {
    /// Build a navigator on the first step. The form must have at least one
    /// step, which `FormSchema` loading already guarantees.
    pub fn new(form: FormSchema, options: NavigatorOptions) -> Self {
        let total_steps = form.total_steps();
        let animator = Animator::new(total_steps, 0, options.strategy, options.animation);
        let mut navigator = Self {
            form,
            state: NavigatorState {
                current_step: 0,
                is_animating: false,
                total_steps,
            },
            animator,
            validator: Validator::new(),
            controls: Controls {
                previous: false,
                next: true,
                submit: false,
            },
            progress: Vec::new(),
            container_height: 0,
            padding: options.padding,
        };
        navigator.refresh_controls();
        navigator.resize_container();
        navigator
    }

    /// Start a transition to `target`. Returns whether it started.
    pub fn go_to(&mut self, target: usize, direction: Direction, now: Instant) -> bool {
        if self.state.is_animating || target >= self.state.total_steps {
            return false;
        }
        let from = self.state.current_step;
        if !self.animator.begin(from, target, direction, now) {
            return false;
        }

        self.state.is_animating = true;
        self.state.current_step = target;
        self.refresh_controls();

        tracing::info!(from, to = target, ?direction, "step transition started");
        true
    }

    /// Validate the current step and advance on success
    pub fn next(&mut self, answers: &AnswerSheet, now: Instant) -> NavOutcome {
        if self.state.is_animating {
            tracing::debug!("next ignored while animating");
            return NavOutcome::Ignored;
        }
        let current = self.state.current_step;
        if current + 1 >= self.state.total_steps {
            return NavOutcome::Ignored;
        }
        if !self.validate_current(answers) {
            return NavOutcome::Invalid;
        }
        if self.go_to(current + 1, Direction::Forward, now) {
            NavOutcome::Advanced
        } else {
            NavOutcome::Ignored
        }
    }

    /// Move back one step; never validates
    pub fn previous(&mut self, now: Instant) -> NavOutcome {
        let current = self.state.current_step;
        if current == 0 {
            return NavOutcome::Ignored;
        }
        if self.go_to(current - 1, Direction::Backward, now) {
            NavOutcome::Retreated
        } else {
            NavOutcome::Ignored
        }
    }

    /// Validate the last step before handing answers to the submit handler
    pub fn submit(&mut self, answers: &AnswerSheet) -> NavOutcome {
        if self.state.is_animating || !self.is_last_step() {
            return NavOutcome::Ignored;
        }
        if self.validate_current(answers) {
            tracing::info!(step = self.state.current_step, "form submitted");
            NavOutcome::Submitted
        } else {
            NavOutcome::Invalid
        }
    }

    /// A panel's slide finished (signal strategy). Returns true when the
    /// transition completed and the lock was released.
    pub fn animation_finished(&mut self, panel: usize) -> bool {
        if self.animator.signal_end(panel) {
            self.finish_transition();
            true
        } else {
            false
        }
    }

    /// Drive the timed strategy; a no-op under the signal strategy
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.animator.tick(now) {
            self.finish_transition();
            true
        } else {
            false
        }
    }

    /// Focus left a field: re-check just that field
    pub fn field_blurred(&mut self, name: &str, answers: &AnswerSheet) -> bool {
        let step = self.state.current_step;
        match self.form.steps[step].field(name) {
            Some(field) => self.validator.validate_field(step, field, answers),
            None => true,
        }
    }

    /// A field was edited: drop its error
    pub fn field_edited(&mut self, name: &str) {
        self.validator.clear_field(name);
    }

    fn validate_current(&mut self, answers: &AnswerSheet) -> bool {
        let index = self.state.current_step;
        self.validator
            .validate_step(index, &self.form.steps[index], answers)
    }

    fn finish_transition(&mut self) {
        self.state.is_animating = false;
        self.resize_container();
        tracing::debug!(
            step = self.state.current_step,
            height = self.container_height,
            "step transition finished"
        );
    }

    fn refresh_controls(&mut self) {
        let current = self.state.current_step;
        let last = self.state.total_steps.saturating_sub(1);
        self.controls = Controls {
            previous: current != 0,
            next: current != last,
            submit: current == last,
        };
        self.progress = (0..self.state.total_steps)
            .map(|i| match i.cmp(&current) {
                std::cmp::Ordering::Less => DotState::Completed,
                std::cmp::Ordering::Equal => DotState::Active,
                std::cmp::Ordering::Greater => DotState::Inactive,
            })
            .collect();
    }

    fn resize_container(&mut self) {
        let step = &self.form.steps[self.state.current_step];
        self.container_height = step.content_rows().saturating_add(self.padding);
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step + 1 == self.state.total_steps
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn progress(&self) -> &[DotState] {
        &self.progress
    }

    /// Rows the form container should occupy
    pub fn container_height(&self) -> u16 {
        self.container_height
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}
