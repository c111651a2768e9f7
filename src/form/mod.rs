//! Form definitions and answers

pub mod schema;
pub mod values;

pub use schema::{FieldKind, FieldOption, FieldSchema, FormError, FormSchema, Rule, StepSchema};
pub use values::{AnswerSheet, FieldValue};
