//! In-memory answers for a form

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::{FieldKind, FieldSchema, FormSchema};

/// Current value of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text and number inputs
    Text(String),
    /// Radio and select fields; `None` until something is picked
    Choice(Option<String>),
    /// Checkbox groups, in option order
    Many(Vec<String>),
}

impl FieldValue {
    /// Empty value matching a field kind
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Number => FieldValue::Text(String::new()),
            FieldKind::Radio | FieldKind::Select => FieldValue::Choice(None),
            FieldKind::Checkbox => FieldValue::Many(Vec::new()),
        }
    }

    /// Initial value for a field, honouring its schema default
    pub fn initial_for(field: &FieldSchema) -> Self {
        match (field.kind, field.default.as_ref()) {
            (_, None) => Self::empty_for(field.kind),
            (FieldKind::Text | FieldKind::Number, Some(d)) => FieldValue::Text(d.clone()),
            (FieldKind::Radio | FieldKind::Select, Some(d)) => FieldValue::Choice(Some(d.clone())),
            (FieldKind::Checkbox, Some(d)) => FieldValue::Many(
                d.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }

    /// True when nothing has been entered or picked
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Choice(c) => c.as_deref().map_or(true, |v| v.trim().is_empty()),
            FieldValue::Many(v) => v.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Choice(c) => c.as_deref(),
            FieldValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> &[String] {
        match self {
            FieldValue::Many(v) => v,
            _ => &[],
        }
    }
}

/// All answers keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    values: BTreeMap<String, FieldValue>,
}

impl AnswerSheet {
    /// Sheet with every field of the form at its initial value
    pub fn for_form(form: &FormSchema) -> Self {
        let values = form
            .steps
            .iter()
            .flat_map(|s| s.fields.iter())
            .map(|f| (f.name.clone(), FieldValue::initial_for(f)))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Value for a field, falling back to an empty value of the right kind
    pub fn value_for(&self, field: &FieldSchema) -> FieldValue {
        self.values
            .get(&field.name)
            .cloned()
            .unwrap_or_else(|| FieldValue::empty_for(field.kind))
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Convenience for text and number fields
    pub fn set_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.set(name, FieldValue::Text(text.into()));
    }

    /// Convenience for radio and select fields
    pub fn set_choice(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, FieldValue::Choice(Some(value.into())));
    }

    /// Text of a field, empty when missing or not textual
    pub fn text(&self, name: &str) -> &str {
        self.values
            .get(name)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
