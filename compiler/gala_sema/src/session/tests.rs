use super::*;
use crate::test_helpers::{call, define, expr_stmt, ret};
use gala_diagnostic::ErrorCode;
use gala_ir::{FunctionScope, StringInterner};
use pretty_assertions::assert_eq;

/// `app` calls `lib.greet()`; listed before `lib`.
fn app_and_lib(interner: &StringInterner) -> Vec<ModuleBuilder> {
    let lib_name = interner.intern("lib");
    let greet = interner.intern("greet");

    let mut app = ModuleBuilder::new(interner.intern("app"));
    app.add_import(lib_name);
    let body = vec![ret(call(&mut app, greet, vec![], false, 11))];
    define(&mut app, interner.intern("main"), FunctionScope::Module, &[], body, 10);

    let mut lib = ModuleBuilder::new(lib_name);
    define(&mut lib, greet, FunctionScope::Module, &[], vec![], 0);

    vec![app, lib]
}

#[test]
fn test_cross_unit_calls_ignore_unit_order() {
    let session = CompilationSession::new(SessionConfig::default());
    let units = app_and_lib(session.interner());
    let results = session.compile_units(units);

    assert_eq!(results.len(), 2);
    let app = results[0].as_ref().unwrap();
    assert_eq!(app.module.name(), session.interner().intern("app"));
    assert_eq!(app.resolutions.len(), 1);
    assert!(results[1].is_ok());
    assert_eq!(session.registries().read().functions.len(), 2);
}

#[test]
fn test_failed_unit_does_not_stop_siblings() {
    let session = CompilationSession::new(SessionConfig::default());
    let interner = session.interner();
    let mut units = app_and_lib(interner);
    // Break `lib`: a second `greet()` is a duplicate declaration.
    define(
        &mut units[1],
        interner.intern("greet"),
        FunctionScope::Module,
        &[],
        vec![],
        5,
    );
    let mut standalone = ModuleBuilder::new(interner.intern("tool"));
    define(&mut standalone, interner.intern("run"), FunctionScope::Module, &[], vec![], 0);
    units.push(standalone);

    let results = session.compile_units(units);
    let outcome: Vec<Option<Vec<ErrorCode>>> = results
        .iter()
        .map(|r| {
            r.as_ref()
                .err()
                .map(|failed| failed.diagnostics.iter().map(|d| d.code).collect())
        })
        .collect();
    assert_eq!(
        outcome,
        vec![
            // `lib` was never registered, so `greet` is unresolved in `app`.
            Some(vec![ErrorCode::E2001]),
            Some(vec![ErrorCode::E1001]),
            None,
        ]
    );
}

#[test]
fn test_error_limit_applies_per_unit() {
    let config = SessionConfig {
        diagnostics: gala_diagnostic::DiagnosticConfig {
            error_limit: 2,
            deduplicate: true,
        },
    };
    let session = CompilationSession::new(config);
    let interner = session.interner();
    let mut unit = ModuleBuilder::new(interner.intern("noisy"));
    let missing = interner.intern("missing");
    let body: Vec<_> = (0..5)
        .map(|i| expr_stmt(call(&mut unit, missing, vec![], false, 20 + i)))
        .collect();
    define(&mut unit, interner.intern("main"), FunctionScope::Module, &[], body, 10);

    let results = session.compile_units(vec![unit]);
    let failed = results[0].as_ref().unwrap_err();
    let codes: Vec<ErrorCode> = failed.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::E2001, ErrorCode::E2001, ErrorCode::E9001]
    );
    assert_eq!(session.config().diagnostics.error_limit, 2);
}
