use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("unresolved call to `speak`")
        .with_secondary_label(Span::new(0, 3), "enclosing function")
        .with_label(Span::new(10, 15), "no function or binding named `speak`")
        .with_note("arity 1");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(10, 15)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes, vec!["arity 1".to_string()]);
}

#[test]
fn test_display() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("duplicate function `f`")
        .with_label(Span::new(4, 9), "redeclared here")
        .with_note("first declared at 0..3");
    assert_eq!(
        diag.to_string(),
        "error [E1001]: duplicate function `f` at 4..9\n  = note: first declared at 0..3"
    );
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic {
        severity: Severity::Warning,
        ..Diagnostic::error(ErrorCode::E2004).with_message("shadowed")
    };
    assert!(!diag.is_error());
    assert!(diag.to_string().starts_with("warning [E2004]"));
    assert_eq!(diag.primary_span(), None);
}
