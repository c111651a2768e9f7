//! Per-step field validation.
//!
//! Validation is synchronous and driven by the rule list each field derives
//! from its schema. Failures are recorded as [`FieldError`]s on an error board
//! that the renderer reads; successes clear whatever was recorded for the
//! field. Running a step twice over unchanged valid input leaves the board
//! empty both times.
//!
//! Field-level policy: a single field is re-checked when focus leaves it
//! (blur) and its error is dropped as soon as it is edited. The whole step is
//! only checked when moving forward or submitting.

use std::collections::BTreeMap;

use crate::form::{AnswerSheet, FieldKind, FieldSchema, FieldValue, Rule, StepSchema};

/// Where an error message is shown
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorTarget {
    /// Inline, under the named field
    Field(String),
    /// Step banner, for group constraints (radio and checkbox groups)
    Banner { step: usize, field: String },
}

/// A human-readable validation failure tied to a field or step banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub target: ErrorTarget,
    pub message: String,
}

/// Validator and the board of currently displayed errors
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<ErrorTarget, FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field on a step. Returns true when all rules hold.
    pub fn validate_step(
        &mut self,
        index: usize,
        step: &StepSchema,
        answers: &AnswerSheet,
    ) -> bool {
        let mut valid = true;
        for field in &step.fields {
            if !self.validate_field(index, field, answers) {
                valid = false;
            }
        }

        if valid {
            tracing::debug!(step = index, "step passed validation");
        } else {
            tracing::debug!(
                step = index,
                errors = self.step_error_count(index, step),
                "step failed validation"
            );
        }
        valid
    }

    /// Check one field and update its entry on the board
    pub fn validate_field(
        &mut self,
        step: usize,
        field: &FieldSchema,
        answers: &AnswerSheet,
    ) -> bool {
        let target = target_for(step, field);
        match check_field(field, &answers.value_for(field)) {
            Ok(()) => {
                self.errors.remove(&target);
                true
            }
            Err(message) => {
                self.errors.insert(target.clone(), FieldError { target, message });
                false
            }
        }
    }

    /// Drop any error recorded for a field (called on input)
    pub fn clear_field(&mut self, name: &str) {
        self.errors.retain(|target, _| match target {
            ErrorTarget::Field(f) => f != name,
            ErrorTarget::Banner { field, .. } => field != name,
        });
    }

    /// Inline error for a field, if any
    pub fn error_for(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(&ErrorTarget::Field(name.to_string()))
    }

    /// Banner errors for a step, in field-name order
    pub fn banner_for(&self, step: usize) -> Vec<&FieldError> {
        self.errors
            .iter()
            .filter(|(target, _)| {
                matches!(target, ErrorTarget::Banner { step: s, .. } if *s == step)
            })
            .map(|(_, e)| e)
            .collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn step_error_count(&self, index: usize, step: &StepSchema) -> usize {
        step.fields
            .iter()
            .filter(|f| self.errors.contains_key(&target_for(index, f)))
            .count()
    }
}

fn target_for(step: usize, field: &FieldSchema) -> ErrorTarget {
    if field.kind.is_group() {
        ErrorTarget::Banner {
            step,
            field: field.name.clone(),
        }
    } else {
        ErrorTarget::Field(field.name.clone())
    }
}

/// Evaluate a field's rules against a value, returning the first failure
pub fn check_field(field: &FieldSchema, value: &FieldValue) -> Result<(), String> {
    let rules = field.rules();

    if value.is_empty() {
        if rules.contains(&Rule::Required) {
            return Err(required_message(field));
        }
        // Optional groups may still demand a minimum
        if let Some(n) = rules.iter().find_map(|r| match r {
            Rule::MinSelected(n) if *n > 0 => Some(*n),
            _ => None,
        }) {
            return Err(min_selected_message(field, n));
        }
        return Ok(());
    }

    let number = if field.kind == FieldKind::Number {
        let text = value.as_text().unwrap_or("").trim();
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => return Err(format!("{} must be a number", field.label)),
        }
    } else {
        None
    };

    for rule in &rules {
        match rule {
            Rule::Required => {}
            Rule::Integer => {
                let text = value.as_text().unwrap_or("").trim();
                if text.parse::<i64>().is_err() {
                    return Err(format!("{} must be a whole number", field.label));
                }
            }
            Rule::Range { min, max } => {
                let Some(n) = number else { continue };
                let below = min.is_some_and(|m| n < m);
                let above = max.is_some_and(|m| n > m);
                if below || above {
                    return Err(range_message(field, *min, *max));
                }
            }
            Rule::MaxLength(max) => {
                let len = value.as_text().map_or(0, |t| t.chars().count());
                if len > *max {
                    return Err(format!(
                        "{} must be at most {} characters",
                        field.label, max
                    ));
                }
            }
            Rule::MinSelected(n) => {
                if value.as_many().len() < *n {
                    return Err(min_selected_message(field, *n));
                }
            }
        }
    }
    Ok(())
}

fn required_message(field: &FieldSchema) -> String {
    match field.kind {
        FieldKind::Text | FieldKind::Number => format!("{} is required", field.label),
        FieldKind::Radio => format!("Select an option for {}", field.label),
        FieldKind::Select => format!("Choose a value for {}", field.label),
        FieldKind::Checkbox => format!("Select at least one option for {}", field.label),
    }
}

fn min_selected_message(field: &FieldSchema, n: usize) -> String {
    if n == 1 {
        format!("Select at least one option for {}", field.label)
    } else {
        format!("Select at least {} options for {}", n, field.label)
    }
}

fn range_message(field: &FieldSchema, min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!(
            "{} must be between {} and {}",
            field.label,
            fmt_number(lo),
            fmt_number(hi)
        ),
        (Some(lo), None) => format!("{} must be at least {}", field.label, fmt_number(lo)),
        (None, Some(hi)) => format!("{} must be at most {}", field.label, fmt_number(hi)),
        (None, None) => format!("{} is out of range", field.label),
    }
}

/// Print whole numbers without a trailing `.0`
fn fmt_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
