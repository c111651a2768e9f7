//! Form screen: progress dots, the sliding step container, controls.

use std::time::Instant;

use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use super::form_field::FormField;
use super::keybindings::footer_line;
use crate::form::{FieldValue, FormSchema};
use crate::navigator::{DotState, Navigator};

/// Widest the form container gets
const MAX_WIDTH: u16 = 72;

/// Widgets for every step plus field focus on the active one
pub struct WizardScreen {
    fields: Vec<Vec<FormField>>,
    focus: usize,
}

impl WizardScreen {
    pub fn new(form: &FormSchema) -> Self {
        let fields = form
            .steps
            .iter()
            .map(|step| step.fields.iter().map(FormField::from_schema).collect())
            .collect();
        Self { fields, focus: 0 }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn reset_focus(&mut self) {
        self.focus = 0;
    }

    /// Name of the focused field on `step`
    pub fn focused_name<'a>(&self, form: &'a FormSchema, step: usize) -> Option<&'a str> {
        form.steps
            .get(step)?
            .fields
            .get(self.focus)
            .map(|f| f.name.as_str())
    }

    /// Move focus forward, wrapping at the end of the step
    pub fn focus_next(&mut self, step: usize) {
        let count = self.fields.get(step).map_or(0, Vec::len);
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    /// Move focus back, wrapping at the start of the step
    pub fn focus_prev(&mut self, step: usize) {
        let count = self.fields.get(step).map_or(0, Vec::len);
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Send a key to the focused field; returns its new value when it changed
    pub fn handle_field_key(&mut self, step: usize, key: KeyCode) -> Option<FieldValue> {
        let field = self.fields.get_mut(step)?.get_mut(self.focus)?;
        let before = field.value();
        field.handle_key(key);
        let after = field.value();
        (after != before).then_some(after)
    }

    /// Render the whole screen
    pub fn render(&self, frame: &mut Frame, nav: &Navigator, now: Instant) {
        let form = nav.form();
        let chunks = Layout::vertical([
            Constraint::Length(2), // Title and description
            Constraint::Length(2), // Progress dots
            Constraint::Min(3),    // Container
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                form.title.as_str(),
                Style::default()
                    .fg(Color::LightMagenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                form.description.as_deref().unwrap_or(""),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        frame.render_widget(
            Paragraph::new(progress_line(nav)).alignment(Alignment::Center),
            chunks[1],
        );

        let body = chunks[2];
        let width = body.width.min(MAX_WIDTH);
        let container = Rect {
            x: body.x + (body.width - width) / 2,
            y: body.y,
            width,
            height: nav.container_height().min(body.height),
        };
        self.render_container(frame.buffer_mut(), container, nav, now);

        frame.render_widget(
            Paragraph::new(footer_line()).alignment(Alignment::Center),
            chunks[3],
        );
    }

    fn render_container(&self, buf: &mut Buffer, area: Rect, nav: &Navigator, now: Instant) {
        let current = nav.current_step();
        let total = nav.state().total_steps;
        let step_title = &nav.form().steps[current].title;

        let block = Block::default()
            .title(format!(" Step {} of {}: {} ", current + 1, total, step_title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let inner = block.inner(area);
        block.render(area, buf);

        let parts = Layout::vertical([
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Banner errors
            Constraint::Length(1), // Controls
        ])
        .split(inner);
        let panel_area = parts[0];

        let animator = nav.animator();
        for panel in animator.visible_panels() {
            let mut scratch = Buffer::empty(panel_area);
            let focused = !nav.is_animating() && panel == current;
            self.render_step(panel, nav, panel_area, &mut scratch, focused);
            let offset = animator.slide_offset(panel, now, panel_area.width);
            blit(&scratch, buf, panel_area, offset);
        }

        if !nav.is_animating() {
            let banner: Vec<Span> = nav
                .validator()
                .banner_for(current)
                .into_iter()
                .map(|e| {
                    Span::styled(
                        format!("! {}  ", e.message),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                })
                .collect();
            Paragraph::new(Line::from(banner)).render(parts[1], buf);
        }

        Paragraph::new(controls_line(nav))
            .alignment(Alignment::Right)
            .render(parts[2], buf);
    }

    fn render_step(
        &self,
        index: usize,
        nav: &Navigator,
        area: Rect,
        buf: &mut Buffer,
        focused: bool,
    ) {
        let step = &nav.form().steps[index];
        let validator = nav.validator();
        let bottom = area.bottom();
        let mut y = area.y;

        let put = |y: u16, line: Line, buf: &mut Buffer| {
            if y < bottom {
                Paragraph::new(line).render(Rect::new(area.x, y, area.width, 1), buf);
            }
        };

        put(
            y,
            Line::from(Span::styled(
                step.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            buf,
        );
        y += 2;
        if let Some(ref description) = step.description {
            put(
                y,
                Line::from(Span::styled(
                    description.as_str(),
                    Style::default().fg(Color::Gray),
                )),
                buf,
            );
            y += 2;
        }

        let widgets = &self.fields[index];
        for (i, (schema, widget)) in step.fields.iter().zip(widgets).enumerate() {
            let has_focus = focused && i == self.focus;
            let label_style = if has_focus {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let mut label = vec![Span::styled(schema.label.as_str(), label_style)];
            if schema.required {
                label.push(Span::styled(" *", Style::default().fg(Color::Red)));
            }
            put(y, Line::from(label), buf);
            y += 1;

            let rows = widget.render_height().min(bottom.saturating_sub(y));
            if rows > 0 {
                let input = Rect::new(area.x + 2, y, area.width.saturating_sub(2), rows);
                widget.render(input, buf, has_focus);
            }
            y += widget.render_height();

            if let Some(error) = validator.error_for(&schema.name) {
                put(
                    y,
                    Line::from(Span::styled(
                        format!("  {}", error.message),
                        Style::default().fg(Color::Red),
                    )),
                    buf,
                );
            }
            y += 2;
        }
    }
}

/// Copy `src` into `dst` shifted horizontally, clipped to `area`
fn blit(src: &Buffer, dst: &mut Buffer, area: Rect, offset: i32) {
    let left = i32::from(area.left());
    let right = i32::from(area.right());
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let target = i32::from(x) + offset;
            if target < left || target >= right {
                continue;
            }
            if let (Some(cell), Some(slot)) = (src.cell((x, y)), dst.cell_mut((target as u16, y))) {
                *slot = cell.clone();
            }
        }
    }
}

fn progress_line(nav: &Navigator) -> Line<'static> {
    let form = nav.form();
    let mut spans = Vec::new();
    for (i, dot) in nav.progress().iter().enumerate() {
        if i > 0 {
            let style = if *dot == DotState::Inactive {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Magenta)
            };
            spans.push(Span::styled("──", style));
        }
        match dot {
            DotState::Completed => {
                spans.push(Span::styled("●", Style::default().fg(Color::Magenta)));
            }
            DotState::Active => {
                spans.push(Span::styled(
                    format!("◉ {}", form.steps[i].title),
                    Style::default()
                        .fg(Color::LightMagenta)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            DotState::Inactive => {
                spans.push(Span::styled("○", Style::default().fg(Color::DarkGray)));
            }
        }
    }
    Line::from(spans)
}

fn controls_line(nav: &Navigator) -> Line<'static> {
    let controls = nav.controls();
    let button = Style::default().fg(Color::Black).bg(Color::Gray);
    let mut spans = Vec::new();
    if controls.previous {
        spans.push(Span::styled(" < Back ", button));
        spans.push(Span::raw("  "));
    }
    if controls.next {
        spans.push(Span::styled(" Next > ", button.bg(Color::Magenta)));
    }
    if controls.submit {
        spans.push(Span::styled(
            " Submit ",
            button.bg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}
