use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Instant;

use crate::animator::CompletionStrategy;
use crate::config::Config;
use crate::form::{AnswerSheet, FormSchema};
use crate::navigator::{NavOutcome, Navigator};
use crate::ui::keybindings::{action_for, Action};
use crate::ui::{TerminalSession, WizardScreen};

/// Interactive form session: navigator, answers and the screen state
pub struct App {
    config: Config,
    navigator: Navigator,
    answers: AnswerSheet,
    wizard: WizardScreen,
    should_quit: bool,
    /// Answers handed over by a successful submit
    submitted: Option<AnswerSheet>,
}

impl App {
    /// Build the session without touching the terminal
    pub fn new(config: Config, form: FormSchema) -> Self {
        let answers = AnswerSheet::for_form(&form);
        let wizard = WizardScreen::new(&form);
        let navigator = Navigator::new(form, config.navigator_options());
        Self {
            config,
            navigator,
            answers,
            wizard,
            should_quit: false,
            submitted: None,
        }
    }

    /// Run until submit or quit. Returns the submitted answers, if any.
    pub fn run(&mut self) -> Result<Option<AnswerSheet>> {
        let mut session = TerminalSession::start()?;
        let tick_rate = self.config.tick_rate();
        tracing::info!(
            steps = self.navigator.state().total_steps,
            strategy = ?self.navigator.animator().strategy(),
            "form session started"
        );

        while !self.should_quit {
            let now = Instant::now();
            session.draw(|f| self.wizard.render(f, &self.navigator, now))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, Instant::now());
                    }
                }
            }

            self.on_tick(Instant::now());
        }

        Ok(self.submitted.take())
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match action_for(key) {
            Some(Action::Advance) => self.advance(now),
            Some(Action::Back) => {
                if self.navigator.current_step() == 0 && !self.navigator.is_animating() {
                    self.should_quit = true;
                } else if self.navigator.previous(now) == NavOutcome::Retreated {
                    self.wizard.reset_focus();
                }
            }
            Some(Action::FocusNext) => {
                self.blur_focused();
                self.wizard.focus_next(self.navigator.current_step());
            }
            Some(Action::FocusPrev) => {
                self.blur_focused();
                self.wizard.focus_prev(self.navigator.current_step());
            }
            Some(Action::Quit) => self.should_quit = true,
            None => {
                if self.navigator.is_animating() {
                    return;
                }
                let step = self.navigator.current_step();
                let Some(value) = self.wizard.handle_field_key(step, key.code) else {
                    return;
                };
                if let Some(name) = self.wizard.focused_name(self.navigator.form(), step) {
                    let name = name.to_string();
                    self.answers.set(name.as_str(), value);
                    self.navigator.field_edited(&name);
                }
            }
        }
    }

    /// Finish transitions whose slides are over
    pub fn on_tick(&mut self, now: Instant) {
        match self.navigator.animator().strategy() {
            CompletionStrategy::Timed => {
                self.navigator.tick(now);
            }
            CompletionStrategy::Signal => {
                let finished = self.navigator.animator().finished_panels(now);
                for panel in finished {
                    self.navigator.animation_finished(panel);
                }
            }
        }
    }

    fn advance(&mut self, now: Instant) {
        let outcome = if self.navigator.is_last_step() {
            self.navigator.submit(&self.answers)
        } else {
            self.navigator.next(&self.answers, now)
        };
        match outcome {
            NavOutcome::Advanced => self.wizard.reset_focus(),
            NavOutcome::Submitted => {
                self.submitted = Some(self.answers.clone());
                self.should_quit = true;
            }
            NavOutcome::Invalid => tracing::debug!("step has errors"),
            NavOutcome::Retreated | NavOutcome::Ignored => {}
        }
    }

    fn blur_focused(&mut self) {
        if self.navigator.is_animating() {
            return;
        }
        let step = self.navigator.current_step();
        if let Some(name) = self.wizard.focused_name(self.navigator.form(), step) {
            let name = name.to_string();
            self.navigator.field_blurred(&name, &self.answers);
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn submitted(&self) -> Option<&AnswerSheet> {
        self.submitted.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldValue;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::Duration;

    fn app() -> App {
        App::new(Config::default(), FormSchema::builtin().unwrap())
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now);
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    /// Let every running slide run to completion
    fn settle(app: &mut App, now: Instant) -> Instant {
        let later = now + Duration::from_secs(1);
        app.on_tick(later);
        later
    }

    fn fill_first_step(app: &mut App, now: Instant) {
        type_text(app, "Ada", now);
        press(app, KeyCode::Tab, now);
        type_text(app, "30", now);
    }

    #[test]
    fn test_typing_updates_answers() {
        let mut app = app();
        let now = Instant::now();
        fill_first_step(&mut app, now);
        assert_eq!(app.answers().text("name"), "Ada");
        assert_eq!(app.answers().text("age"), "30");
    }

    #[test]
    fn test_enter_on_empty_step_shows_errors() {
        let mut app = app();
        let now = Instant::now();
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.navigator().current_step(), 0);
        assert!(app.navigator().validator().error_for("name").is_some());
    }

    #[test]
    fn test_editing_clears_error() {
        let mut app = app();
        let now = Instant::now();
        press(&mut app, KeyCode::Enter, now);
        type_text(&mut app, "A", now);
        assert!(app.navigator().validator().error_for("name").is_none());
        assert!(app.navigator().validator().error_for("age").is_some());
    }

    #[test]
    fn test_tab_blur_validates_field() {
        let mut app = app();
        let now = Instant::now();
        press(&mut app, KeyCode::Tab, now);
        assert_eq!(
            app.navigator().validator().error_for("name").map(|e| e.message.as_str()),
            Some("Name is required")
        );
    }

    #[test]
    fn test_double_enter_advances_once() {
        let mut app = app();
        let now = Instant::now();
        fill_first_step(&mut app, now);
        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.navigator().current_step(), 1);
        assert!(app.navigator().is_animating());

        settle(&mut app, now);
        assert!(!app.navigator().is_animating());
        assert_eq!(app.navigator().current_step(), 1);
        assert!(!app.navigator().validator().has_errors());
    }

    #[test]
    fn test_keys_ignored_while_animating() {
        let mut app = app();
        let now = Instant::now();
        fill_first_step(&mut app, now);
        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Char(' '), now);
        assert_eq!(
            app.answers().get("skin_type"),
            Some(&FieldValue::Choice(None))
        );
    }

    #[test]
    fn test_escape_on_first_step_quits() {
        let mut app = app();
        press(&mut app, KeyCode::Esc, Instant::now());
        assert!(app.should_quit());
        assert!(app.submitted().is_none());
    }

    #[test]
    fn test_escape_goes_back_without_validation() {
        let mut app = app();
        let now = Instant::now();
        fill_first_step(&mut app, now);
        press(&mut app, KeyCode::Enter, now);
        let now = settle(&mut app, now);

        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.navigator().current_step(), 0);
        assert!(!app.should_quit());
        assert!(!app.navigator().validator().has_errors());
    }

    #[test]
    fn test_full_walkthrough_submits() {
        let mut app = app();
        let now = Instant::now();
        fill_first_step(&mut app, now);
        press(&mut app, KeyCode::Enter, now);
        let now = settle(&mut app, now);

        // Skin type: select the highlighted first option
        press(&mut app, KeyCode::Char(' '), now);
        press(&mut app, KeyCode::Enter, now);
        let now = settle(&mut app, now);
        assert_eq!(app.navigator().current_step(), 2);

        // Frequency select starts empty
        press(&mut app, KeyCode::Enter, now);
        assert!(app.submitted().is_none());
        assert!(app.navigator().validator().error_for("frequency").is_some());

        press(&mut app, KeyCode::Down, now);
        press(&mut app, KeyCode::Enter, now);
        assert!(app.should_quit());
        let answers = app.submitted().unwrap();
        assert_eq!(answers.text("name"), "Ada");
        assert!(answers.get("frequency").is_some_and(|v| !v.is_empty()));
    }

    #[test]
    fn test_timed_strategy_ticks() {
        let mut config = Config::default();
        config.ui.animation = CompletionStrategy::Timed;
        let mut app = App::new(config, FormSchema::builtin().unwrap());
        let now = Instant::now();
        fill_first_step(&mut app, now);
        press(&mut app, KeyCode::Enter, now);
        app.on_tick(now);
        assert!(app.navigator().is_animating());
        settle(&mut app, now);
        assert!(!app.navigator().is_animating());
    }
}
