//! Schema definitions for multi-step forms

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in questionnaire used when no form file is given
const BUILTIN_FORM: &str = include_str!("../../forms/skinfit.toml");

/// Errors raised while loading or checking a form definition
#[derive(Error, Debug)]
pub enum FormError {
    #[error("failed to read form file {0}: {1}")]
    Read(String, std::io::Error),

    #[error("failed to parse form definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("form has no steps")]
    NoSteps,

    #[error("field '{0}' is defined more than once")]
    DuplicateField(String),

    #[error("field '{0}' needs at least one option")]
    MissingOptions(String),

    #[error("field '{0}' has min {1} greater than max {2}")]
    InvalidRange(String, f64, f64),

    #[error("field '{0}' sets a numeric range but is not a number field")]
    RangeOnNonNumber(String),

    #[error("field '{0}' is marked integer but is not a number field")]
    IntegerOnNonNumber(String),

    #[error("field '{0}' has default '{1}' which is not one of its options")]
    UnknownDefault(String, String),
}

/// Complete form definition: an ordered list of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSchema {
    /// Title shown on the form frame
    pub title: String,
    /// Optional subtitle
    #[serde(default)]
    pub description: Option<String>,
    /// Steps in display order; the index is fixed at load
    pub steps: Vec<StepSchema>,
}

/// One panel of the form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSchema {
    /// Step identifier
    pub name: String,
    /// Heading shown at the top of the panel
    pub title: String,
    /// Help text under the heading
    #[serde(default)]
    pub description: Option<String>,
    /// Input fields on this step
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// A selectable option for radio, select and checkbox fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldOption {
    /// Submitted value
    pub value: String,
    /// Display label
    pub label: String,
}

/// Schema definition for a single input field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field identifier, unique across the whole form
    pub name: String,
    /// Label shown above the input
    pub label: String,
    /// Type of the field
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Whether this field must be filled before moving forward
    #[serde(default)]
    pub required: bool,
    /// Options for radio, select and checkbox fields
    #[serde(default)]
    pub options: Vec<FieldOption>,
    /// Placeholder text for empty inputs
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Initial value (option value for choice fields)
    #[serde(default)]
    pub default: Option<String>,
    /// Inclusive lower bound for number fields
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for number fields
    #[serde(default)]
    pub max: Option<f64>,
    /// Number fields only accept whole numbers
    #[serde(default)]
    pub integer: bool,
    /// Maximum length in characters for text fields
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Minimum number of checked boxes for checkbox groups
    #[serde(default)]
    pub min_selected: Option<usize>,
}

/// Kinds of input supported on a step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Single-line numeric input
    Number,
    /// Single choice shown as a radio group
    Radio,
    /// Single choice from a drop-down list
    Select,
    /// Any number of options from a group of check boxes
    Checkbox,
}

/// A validation constraint attached to a field
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A value must be present
    Required,
    /// Whole number, without a decimal point or exponent
    Integer,
    /// Numeric value within `[min, max]`; open ends are unbounded
    Range { min: Option<f64>, max: Option<f64> },
    /// Text no longer than this many characters
    MaxLength(usize),
    /// At least this many check boxes ticked
    MinSelected(usize),
}

impl FieldKind {
    /// Whether the field carries a fixed option list
    pub fn has_options(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Select | FieldKind::Checkbox)
    }

    /// Whether errors for this field belong on the step banner instead of inline
    pub fn is_group(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Checkbox)
    }
}

impl FieldSchema {
    /// Explicit rule list for this field, in evaluation order
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();
        if self.required {
            rules.push(Rule::Required);
        }
        if self.integer {
            rules.push(Rule::Integer);
        }
        if self.min.is_some() || self.max.is_some() {
            rules.push(Rule::Range {
                min: self.min,
                max: self.max,
            });
        }
        if let Some(max) = self.max_length {
            rules.push(Rule::MaxLength(max));
        }
        if let Some(n) = self.min_selected {
            rules.push(Rule::MinSelected(n));
        }
        rules
    }

    /// Rows the input itself occupies (without label or error line)
    pub fn input_rows(&self) -> u16 {
        match self.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Select => 1,
            FieldKind::Radio | FieldKind::Checkbox => self.options.len().max(1) as u16,
        }
    }

    /// Rows for label, input, error line and spacer
    pub fn block_rows(&self) -> u16 {
        self.input_rows() + 3
    }

    /// Look up the display label for an option value
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

impl StepSchema {
    /// Height of the step content in rows, used to size the form container
    pub fn content_rows(&self) -> u16 {
        // Title plus blank line
        let mut rows = 2;
        if self.description.is_some() {
            rows += 2;
        }
        rows + self.fields.iter().map(FieldSchema::block_rows).sum::<u16>()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FormSchema {
    /// Parse and check a form definition from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, FormError> {
        let form: FormSchema = toml::from_str(text)?;
        form.check()?;
        Ok(form)
    }

    /// Load a form definition from a file
    pub fn load(path: &Path) -> Result<Self, FormError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FormError::Read(path.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }

    /// The built-in skin profile questionnaire
    pub fn builtin() -> Result<Self, FormError> {
        Self::from_toml_str(BUILTIN_FORM)
    }

    /// Load from `path` when given, otherwise fall back to the built-in form
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, FormError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Find a field anywhere in the form, with the index of its step
    pub fn find_field(&self, name: &str) -> Option<(usize, &FieldSchema)> {
        self.steps
            .iter()
            .enumerate()
            .find_map(|(i, step)| step.field(name).map(|f| (i, f)))
    }

    /// Structural checks that serde cannot express
    pub fn check(&self) -> Result<(), FormError> {
        if self.steps.is_empty() {
            return Err(FormError::NoSteps);
        }

        let mut seen = HashSet::new();
        for field in self.steps.iter().flat_map(|s| s.fields.iter()) {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
            if field.kind.has_options() && field.options.is_empty() {
                return Err(FormError::MissingOptions(field.name.clone()));
            }
            if field.integer && field.kind != FieldKind::Number {
                return Err(FormError::IntegerOnNonNumber(field.name.clone()));
            }
            if field.min.is_some() || field.max.is_some() {
                if field.kind != FieldKind::Number {
                    return Err(FormError::RangeOnNonNumber(field.name.clone()));
                }
                if let (Some(min), Some(max)) = (field.min, field.max) {
                    if min > max {
                        return Err(FormError::InvalidRange(field.name.clone(), min, max));
                    }
                }
            }
            if let Some(ref default) = field.default {
                if field.kind.has_options() && field.option_label(default).is_none() {
                    return Err(FormError::UnknownDefault(
                        field.name.clone(),
                        default.clone(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_form_loads() {
        let form = FormSchema::builtin().unwrap();
        assert_eq!(form.total_steps(), 3);
        assert_eq!(form.steps[0].fields[1].name, "age");
        assert_eq!(form.steps[0].fields[1].min, Some(10.0));
        assert_eq!(form.steps[1].fields[0].kind, FieldKind::Radio);
    }

    #[test]
    fn test_rules_follow_schema_order() {
        let form = FormSchema::builtin().unwrap();
        let (_, age) = form.find_field("age").unwrap();
        assert_eq!(
            age.rules(),
            vec![
                Rule::Required,
                Rule::Integer,
                Rule::Range {
                    min: Some(10.0),
                    max: Some(100.0)
                }
            ]
        );

        let (step, conditions) = form.find_field("conditions").unwrap();
        assert_eq!(step, 1);
        assert!(conditions.rules().is_empty());
    }

    #[test]
    fn test_empty_form_rejected() {
        let err = FormSchema::from_toml_str("title = \"x\"\nsteps = []\n").unwrap_err();
        assert!(matches!(err, FormError::NoSteps));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let text = r#"
title = "dup"

[[steps]]
name = "a"
title = "A"
fields = [{ name = "x", label = "X", type = "text" }]

[[steps]]
name = "b"
title = "B"
fields = [{ name = "x", label = "X again", type = "text" }]
"#;
        let err = FormSchema::from_toml_str(text).unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(name) if name == "x"));
    }

    #[test]
    fn test_choice_without_options_rejected() {
        let text = r#"
title = "t"

[[steps]]
name = "a"
title = "A"
fields = [{ name = "pick", label = "Pick", type = "radio" }]
"#;
        let err = FormSchema::from_toml_str(text).unwrap_err();
        assert!(matches!(err, FormError::MissingOptions(_)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let text = r#"
title = "t"

[[steps]]
name = "a"
title = "A"
fields = [{ name = "n", label = "N", type = "number", min = 5, max = 1 }]
"#;
        let err = FormSchema::from_toml_str(text).unwrap_err();
        assert!(matches!(err, FormError::InvalidRange(_, _, _)));
    }

    #[test]
    fn test_integer_on_text_field_rejected() {
        let text = r#"
title = "t"

[[steps]]
name = "a"
title = "A"
fields = [{ name = "n", label = "N", type = "text", integer = true }]
"#;
        let err = FormSchema::from_toml_str(text).unwrap_err();
        assert!(matches!(err, FormError::IntegerOnNonNumber(name) if name == "n"));
    }

    #[test]
    fn test_content_rows_counts_fields() {
        let form = FormSchema::builtin().unwrap();
        // title(2) + description(2) + name(4) + age(4)
        assert_eq!(form.steps[0].content_rows(), 12);
        // title(2) + description(2) + radio 5 options(8) + checkbox 4 options(7)
        assert_eq!(form.steps[1].content_rows(), 19);
    }
}
