//! Input widgets for each field kind

use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::form::{FieldKind, FieldOption, FieldSchema, FieldValue};

/// An editable widget bound to one schema field
#[derive(Debug, Clone)]
pub enum FormField {
    /// Single-line text or number input; `cursor` is a char index
    TextInput {
        value: String,
        cursor: usize,
        placeholder: String,
        max_length: Option<usize>,
        numeric: bool,
        /// Whole numbers only: no decimal point
        integer: bool,
    },
    /// One choice from a visible list
    Radio {
        options: Vec<FieldOption>,
        highlighted: usize,
        selected: Option<usize>,
    },
    /// One choice cycled in place, with a placeholder until picked
    Select {
        options: Vec<FieldOption>,
        selected: Option<usize>,
        placeholder: String,
    },
    /// Any number of ticked options
    Checkbox {
        options: Vec<FieldOption>,
        highlighted: usize,
        checked: Vec<bool>,
    },
}

/// Byte offset of the `idx`-th char, or the string length past the end
fn byte_index(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(i, _)| i)
}

impl FormField {
    /// Create a widget from a schema definition, honouring its default
    pub fn from_schema(schema: &FieldSchema) -> Self {
        let option_index = |value: &str| schema.options.iter().position(|o| o.value == value);

        match schema.kind {
            FieldKind::Text | FieldKind::Number => {
                let value = schema.default.clone().unwrap_or_default();
                FormField::TextInput {
                    cursor: value.chars().count(),
                    value,
                    placeholder: schema.placeholder.clone().unwrap_or_default(),
                    max_length: schema.max_length,
                    numeric: schema.kind == FieldKind::Number,
                    integer: schema.integer,
                }
            }
            FieldKind::Radio => {
                let selected = schema.default.as_deref().and_then(option_index);
                FormField::Radio {
                    options: schema.options.clone(),
                    highlighted: selected.unwrap_or(0),
                    selected,
                }
            }
            FieldKind::Select => FormField::Select {
                options: schema.options.clone(),
                selected: schema.default.as_deref().and_then(option_index),
                placeholder: schema
                    .placeholder
                    .clone()
                    .unwrap_or_else(|| "Select...".to_string()),
            },
            FieldKind::Checkbox => {
                let defaults = FieldValue::initial_for(schema);
                let checked = schema
                    .options
                    .iter()
                    .map(|o| defaults.as_many().contains(&o.value))
                    .collect();
                FormField::Checkbox {
                    options: schema.options.clone(),
                    highlighted: 0,
                    checked,
                }
            }
        }
    }

    /// Current value in answer-sheet form
    pub fn value(&self) -> FieldValue {
        match self {
            FormField::TextInput { value, .. } => FieldValue::Text(value.clone()),
            FormField::Radio {
                options, selected, ..
            }
            | FormField::Select {
                options, selected, ..
            } => FieldValue::Choice(selected.and_then(|i| options.get(i)).map(|o| o.value.clone())),
            FormField::Checkbox {
                options, checked, ..
            } => FieldValue::Many(
                options
                    .iter()
                    .zip(checked)
                    .filter(|(_, on)| **on)
                    .map(|(o, _)| o.value.clone())
                    .collect(),
            ),
        }
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor,
                max_length,
                numeric,
                integer,
                ..
            } => match key {
                KeyCode::Char(c) => {
                    let allowed = c.is_ascii_digit() || c == '-' || (c == '.' && !*integer);
                    if *numeric && !allowed {
                        return true;
                    }
                    if max_length.map_or(true, |m| value.chars().count() < m) {
                        let at = byte_index(value, *cursor);
                        value.insert(at, c);
                        *cursor += 1;
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor > 0 {
                        *cursor -= 1;
                        let at = byte_index(value, *cursor);
                        value.remove(at);
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor < value.chars().count() {
                        let at = byte_index(value, *cursor);
                        value.remove(at);
                    }
                    true
                }
                KeyCode::Left => {
                    *cursor = cursor.saturating_sub(1);
                    true
                }
                KeyCode::Right => {
                    if *cursor < value.chars().count() {
                        *cursor += 1;
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor = 0;
                    true
                }
                KeyCode::End => {
                    *cursor = value.chars().count();
                    true
                }
                _ => false,
            },
            FormField::Radio {
                options,
                highlighted,
                selected,
            } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    *highlighted = highlighted.saturating_sub(1);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *highlighted + 1 < options.len() {
                        *highlighted += 1;
                    }
                    true
                }
                KeyCode::Char(' ') => {
                    *selected = Some(*highlighted);
                    true
                }
                _ => false,
            },
            FormField::Select {
                options, selected, ..
            } => {
                let len = options.len();
                if len == 0 {
                    return false;
                }
                match key {
                    KeyCode::Down | KeyCode::Right | KeyCode::Char('j' | ' ') => {
                        *selected = Some(selected.map_or(0, |i| (i + 1) % len));
                        true
                    }
                    KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                        *selected = Some(selected.map_or(len - 1, |i| (i + len - 1) % len));
                        true
                    }
                    _ => false,
                }
            }
            FormField::Checkbox {
                options,
                highlighted,
                checked,
            } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    *highlighted = highlighted.saturating_sub(1);
                    true
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if *highlighted + 1 < options.len() {
                        *highlighted += 1;
                    }
                    true
                }
                KeyCode::Char(' ') => {
                    if let Some(on) = checked.get_mut(*highlighted) {
                        *on = !*on;
                    }
                    true
                }
                _ => false,
            },
        }
    }

    /// Get the height needed to render this field
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextInput { .. } | FormField::Select { .. } => 1,
            FormField::Radio { options, .. } | FormField::Checkbox { options, .. } => {
                options.len().max(1) as u16
            }
        }
    }

    /// Render the field into `buf`
    pub fn render(&self, area: Rect, buf: &mut Buffer, focused: bool) {
        let text_style = Style::default().fg(if focused { Color::White } else { Color::Gray });

        match self {
            FormField::TextInput {
                value,
                cursor,
                placeholder,
                max_length,
                ..
            } => {
                let line = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    let mut text = value.clone();
                    if focused {
                        text.insert(byte_index(&text, *cursor), '|');
                    }
                    let suffix = max_length
                        .filter(|_| focused)
                        .map(|m| format!(" ({}/{})", value.chars().count(), m))
                        .unwrap_or_default();
                    Line::from(vec![
                        Span::raw(text),
                        Span::styled(suffix, Style::default().fg(Color::DarkGray)),
                    ])
                };
                Paragraph::new(line).style(text_style).render(area, buf);
            }
            FormField::Radio {
                options,
                highlighted,
                selected,
            } => {
                let lines: Vec<Line> = options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| {
                        let is_selected = *selected == Some(i);
                        let under_cursor = focused && i == *highlighted;
                        let marker = if under_cursor { "> " } else { "  " };
                        let radio = if is_selected { "(o)" } else { "( )" };
                        Line::from(vec![
                            Span::styled(marker, Style::default().fg(Color::Cyan)),
                            Span::styled(
                                radio,
                                Style::default().fg(if is_selected {
                                    Color::Green
                                } else {
                                    Color::DarkGray
                                }),
                            ),
                            Span::raw(" "),
                            Span::styled(opt.label.as_str(), text_style),
                        ])
                    })
                    .collect();
                Paragraph::new(lines).render(area, buf);
            }
            FormField::Select {
                options,
                selected,
                placeholder,
            } => {
                let (label, style) = match selected.and_then(|i| options.get(i)) {
                    Some(opt) => (opt.label.as_str(), text_style),
                    None => (placeholder.as_str(), Style::default().fg(Color::DarkGray)),
                };
                let arrow_style = if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Paragraph::new(Line::from(vec![
                    Span::styled("< ", arrow_style),
                    Span::styled(label, style.add_modifier(Modifier::BOLD)),
                    Span::styled(" >", arrow_style),
                ]))
                .render(area, buf);
            }
            FormField::Checkbox {
                options,
                highlighted,
                checked,
            } => {
                let lines: Vec<Line> = options
                    .iter()
                    .zip(checked)
                    .enumerate()
                    .map(|(i, (opt, on))| {
                        let under_cursor = focused && i == *highlighted;
                        let marker = if under_cursor { "> " } else { "  " };
                        let tick = if *on { "[x]" } else { "[ ]" };
                        Line::from(vec![
                            Span::styled(marker, Style::default().fg(Color::Cyan)),
                            Span::styled(
                                tick,
                                Style::default()
                                    .fg(if *on { Color::Green } else { Color::DarkGray }),
                            ),
                            Span::raw(" "),
                            Span::styled(opt.label.as_str(), text_style),
                        ])
                    })
                    .collect();
                Paragraph::new(lines).render(area, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormSchema;

    fn field(name: &str) -> FormField {
        let form = FormSchema::builtin().unwrap();
        let (_, schema) = form.find_field(name).unwrap();
        FormField::from_schema(schema)
    }

    #[test]
    fn test_text_input_handles_chars() {
        let mut f = field("name");
        assert!(f.handle_key(KeyCode::Char('h')));
        assert!(f.handle_key(KeyCode::Char('i')));
        assert_eq!(f.value(), FieldValue::Text("hi".to_string()));

        f.handle_key(KeyCode::Home);
        f.handle_key(KeyCode::Delete);
        assert_eq!(f.value(), FieldValue::Text("i".to_string()));
    }

    #[test]
    fn test_text_input_multibyte_editing() {
        let mut f = field("name");
        for c in "Zoë".chars() {
            f.handle_key(KeyCode::Char(c));
        }
        f.handle_key(KeyCode::Left);
        f.handle_key(KeyCode::Backspace);
        assert_eq!(f.value(), FieldValue::Text("Zë".to_string()));
    }

    #[test]
    fn test_text_input_respects_max_length() {
        let mut f = field("name");
        for _ in 0..45 {
            f.handle_key(KeyCode::Char('a'));
        }
        assert_eq!(f.value(), FieldValue::Text("a".repeat(40)));
    }

    #[test]
    fn test_number_input_filters_letters() {
        let mut f = field("age");
        f.handle_key(KeyCode::Char('3'));
        f.handle_key(KeyCode::Char('x'));
        f.handle_key(KeyCode::Char('0'));
        assert_eq!(f.value(), FieldValue::Text("30".to_string()));
    }

    #[test]
    fn test_integer_input_drops_decimal_point() {
        let mut f = field("age");
        for c in "30.5".chars() {
            f.handle_key(KeyCode::Char(c));
        }
        assert_eq!(f.value(), FieldValue::Text("305".to_string()));
    }

    #[test]
    fn test_radio_select_with_space() {
        let mut f = field("skin_type");
        assert_eq!(f.value(), FieldValue::Choice(None));
        f.handle_key(KeyCode::Down);
        f.handle_key(KeyCode::Down);
        assert_eq!(f.value(), FieldValue::Choice(None));
        f.handle_key(KeyCode::Char(' '));
        assert_eq!(f.value(), FieldValue::Choice(Some("combination".to_string())));
    }

    #[test]
    fn test_select_cycles() {
        let mut f = field("frequency");
        assert_eq!(f.value(), FieldValue::Choice(None));
        f.handle_key(KeyCode::Down);
        assert_eq!(f.value(), FieldValue::Choice(Some("full".to_string())));
        f.handle_key(KeyCode::Up);
        assert_eq!(f.value(), FieldValue::Choice(Some("minimal".to_string())));
    }

    #[test]
    fn test_checkbox_toggles() {
        let mut f = field("conditions");
        f.handle_key(KeyCode::Char(' '));
        f.handle_key(KeyCode::Down);
        f.handle_key(KeyCode::Down);
        f.handle_key(KeyCode::Char(' '));
        assert_eq!(
            f.value(),
            FieldValue::Many(vec!["acne".to_string(), "wrinkles".to_string()])
        );
        f.handle_key(KeyCode::Up);
        f.handle_key(KeyCode::Up);
        f.handle_key(KeyCode::Char(' '));
        assert_eq!(f.value(), FieldValue::Many(vec!["wrinkles".to_string()]));
    }

    #[test]
    fn test_render_height_matches_schema() {
        let form = FormSchema::builtin().unwrap();
        for schema in form.steps.iter().flat_map(|s| s.fields.iter()) {
            assert_eq!(
                FormField::from_schema(schema).render_height(),
                schema.input_rows()
            );
        }
    }

    #[test]
    fn test_render_radio_marks_selection() {
        let mut f = field("skin_type");
        f.handle_key(KeyCode::Char(' '));
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        f.render(area, &mut buf, true);

        let first: String = (0..area.width)
            .filter_map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(first.starts_with("> (o) Dry"));
    }
}
