//! Integration tests for loading form definitions from disk

use std::io::Write;

use stepform::form::{FieldKind, FormError, FormSchema};
use tempfile::NamedTempFile;

fn write_form(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write form");
    file
}

#[test]
fn test_load_form_from_file() {
    let file = write_form(
        r#"
title = "Feedback"

[[steps]]
name = "rating"
title = "Rating"

[[steps.fields]]
name = "score"
label = "Score"
type = "select"
required = true
options = [
    { value = "good", label = "Good" },
    { value = "bad", label = "Bad" },
]
"#,
    );

    let form = FormSchema::load(file.path()).expect("form loads");
    assert_eq!(form.title, "Feedback");
    assert_eq!(form.total_steps(), 1);
    let (step, field) = form.find_field("score").expect("score field");
    assert_eq!(step, 0);
    assert_eq!(field.kind, FieldKind::Select);
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = FormSchema::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FormError::Read(..)));
}

#[test]
fn test_form_without_steps_is_rejected() {
    let file = write_form("title = \"Empty\"\nsteps = []\n");
    assert!(matches!(
        FormSchema::load(file.path()),
        Err(FormError::NoSteps)
    ));
}

#[test]
fn test_choice_field_without_options_is_rejected() {
    let file = write_form(
        r#"
title = "Broken"

[[steps]]
name = "one"
title = "One"

[[steps.fields]]
name = "color"
label = "Color"
type = "radio"
"#,
    );
    assert!(matches!(
        FormSchema::load(file.path()),
        Err(FormError::MissingOptions(name)) if name == "color"
    ));
}

#[test]
fn test_load_or_builtin_falls_back() {
    let form = FormSchema::load_or_builtin(None).expect("builtin form");
    assert_eq!(form.total_steps(), 3);
    assert!(form.find_field("skin_type").is_some());
}
