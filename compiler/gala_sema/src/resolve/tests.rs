use super::*;
use crate::test_helpers::{
    call, closure, define, expr_stmt, int, let_const, method, reference, ret, site_of,
};
use crate::{verify_locals, ModuleBuilder, Registries};
use gala_diagnostic::DiagnosticConfig;
use gala_ir::{Constant, Expr, ExprKind, Visibility};
use pretty_assertions::assert_eq;

struct Resolved {
    resolutions: Resolutions,
    errors: Vec<Diagnostic>,
}

/// Publish, register and resolve `units`; returns the outcome of the last.
fn resolve_last(units: Vec<ModuleBuilder>, interner: &StringInterner) -> Resolved {
    let modules: Vec<Module> = units
        .into_iter()
        .map(|unit| unit.finish(interner).unwrap())
        .collect();
    let mut registries = Registries::default();
    for module in &modules {
        registries.register_module(module);
    }
    let module = modules.last().unwrap();
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let locals = verify_locals(module, interner, &mut queue);
    let resolutions = resolve_module(
        module,
        &registries.functions,
        &registries.extensions,
        &locals,
        interner,
        &mut queue,
    );
    Resolved {
        resolutions,
        errors: queue.flush(),
    }
}

fn string_literal(interner: &StringInterner, start: u32) -> Expr {
    Expr::new(
        ExprKind::Constant(Constant::Str(interner.intern("hi"))),
        crate::test_helpers::at(start),
    )
}

#[test]
fn test_direct_link_to_module_function() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let double = interner.intern("double");
    let x = interner.intern("x");
    let helper = define(
        &mut builder,
        double,
        FunctionScope::Module,
        &[x],
        vec![ret(reference(x, 1))],
        0,
    );
    let site_expr = call(&mut builder, double, vec![int(2, 12)], false, 11);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![ret(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert_eq!(resolved.errors, vec![]);
    match resolved.resolutions.get(site) {
        Some(Resolution::Direct(target)) => {
            assert_eq!(target.function, helper);
            assert_eq!(target.module, interner.intern("app"));
            assert!(!target.varargs);
        }
        other => panic!("expected direct link, got {other:?}"),
    }
}

#[test]
fn test_direct_link_wins_over_local_binding() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let f = interner.intern("f");
    define(&mut builder, f, FunctionScope::Module, &[], vec![], 0);
    let site_expr = call(&mut builder, f, vec![], false, 12);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![let_const(f, int(1, 11)), expr_stmt(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert!(matches!(
        resolved.resolutions.get(site),
        Some(Resolution::Direct(_))
    ));
}

#[test]
fn test_local_closure_binding_shadows_module_function() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let f = interner.intern("f");
    let x = interner.intern("x");

    // A module function `f(x)` and a closure bound to a local `f` with the
    // same arity. The call goes through the binding.
    define(&mut builder, f, FunctionScope::Module, &[x], vec![ret(reference(x, 1))], 0);
    let lambda = define(
        &mut builder,
        interner.intern("lambda"),
        FunctionScope::Closure,
        &[x],
        vec![ret(reference(x, 6))],
        5,
    );
    let site_expr = call(&mut builder, f, vec![int(3, 13)], true, 12);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![let_const(f, closure(lambda, 11)), ret(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert_eq!(resolved.errors, vec![]);
    assert_eq!(resolved.resolutions.get(site), Some(Resolution::Reference(f)));
}

#[test]
fn test_binding_used_when_no_function_matches() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let callback = interner.intern("callback");
    let site_expr = call(&mut builder, callback, vec![], false, 11);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("run"),
        FunctionScope::Module,
        &[callback],
        vec![ret(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert_eq!(
        resolved.resolutions.get(site),
        Some(Resolution::Reference(callback))
    );
}

#[test]
fn test_call_resolves_alike_inside_closure() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let g = interner.intern("g");

    // run(g) { let x = closure { return g(1) }; return g(1) }
    let inner_expr = call(&mut builder, g, vec![int(1, 2)], false, 1);
    let inner = site_of(&inner_expr);
    let lambda = define(
        &mut builder,
        interner.intern("lambda"),
        FunctionScope::Closure,
        &[],
        vec![ret(inner_expr)],
        0,
    );
    let outer_expr = call(&mut builder, g, vec![int(1, 13)], false, 12);
    let outer = site_of(&outer_expr);
    define(
        &mut builder,
        interner.intern("run"),
        FunctionScope::Module,
        &[g],
        vec![
            let_const(interner.intern("x"), closure(lambda, 11)),
            ret(outer_expr),
        ],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert_eq!(resolved.errors, vec![]);
    assert_eq!(
        resolved.resolutions.get(outer),
        Some(Resolution::Reference(g))
    );
    assert_eq!(
        resolved.resolutions.get(inner),
        Some(Resolution::Reference(g))
    );
}

#[test]
fn test_reference_call_without_binding_is_unresolved() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let ghost = interner.intern("ghost");
    // A module function of the same name does not satisfy a reference call.
    define(&mut builder, ghost, FunctionScope::Module, &[], vec![], 0);
    let site_expr = call(&mut builder, ghost, vec![], true, 11);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![expr_stmt(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    let codes: Vec<ErrorCode> = resolved.errors.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2001]);
    assert_eq!(resolved.resolutions.get(site), None);
}

#[test]
fn test_unresolved_calls_are_batched() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let known = interner.intern("known");
    define(&mut builder, known, FunctionScope::Module, &[], vec![], 0);
    let first = call(&mut builder, interner.intern("missing"), vec![], false, 11);
    let good_expr = call(&mut builder, known, vec![], false, 12);
    let good = site_of(&good_expr);
    // Right name, wrong arity.
    let second = call(&mut builder, known, vec![int(1, 14)], false, 13);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![expr_stmt(first), expr_stmt(good_expr), expr_stmt(second)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    let codes: Vec<ErrorCode> = resolved.errors.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2001, ErrorCode::E2001]);
    assert!(resolved.resolutions.get(good).is_some());
    assert_eq!(resolved.resolutions.len(), 1);
}

#[test]
fn test_cross_unit_visibility() {
    let interner = StringInterner::new();
    let lib_name = interner.intern("lib");
    let mut lib = ModuleBuilder::new(lib_name);
    let shared = interner.intern("shared");
    let private = interner.intern("private");
    let shared_id = define(&mut lib, shared, FunctionScope::Module, &[], vec![], 0);
    let hidden = lib.declare(
        private,
        Visibility::Local,
        FunctionScope::Module,
        crate::test_helpers::at(2),
    );
    lib.function_mut(hidden).set_body(gala_ir::Block::default());

    let mut app = ModuleBuilder::new(interner.intern("app"));
    app.add_import(lib_name);
    let public_call = call(&mut app, shared, vec![], false, 11);
    let public_site = site_of(&public_call);
    let private_call = call(&mut app, private, vec![], false, 12);
    define(
        &mut app,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![expr_stmt(public_call), expr_stmt(private_call)],
        10,
    );

    let resolved = resolve_last(vec![lib, app], &interner);
    match resolved.resolutions.get(public_site) {
        Some(Resolution::Direct(target)) => {
            assert_eq!((target.module, target.function), (lib_name, shared_id));
        }
        other => panic!("expected direct link, got {other:?}"),
    }
    let codes: Vec<ErrorCode> = resolved.errors.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2001]);
}

#[test]
fn test_varargs_direct_link() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let log = interner.intern("log");
    let id = define(
        &mut builder,
        log,
        FunctionScope::Module,
        &[interner.intern("rest")],
        vec![],
        0,
    );
    builder.function_mut(id).set_varargs(true);
    let site_expr = call(&mut builder, log, vec![int(1, 12), int(2, 13), int(3, 14)], false, 11);
    let site = site_of(&site_expr);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[],
        vec![expr_stmt(site_expr)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    match resolved.resolutions.get(site) {
        Some(Resolution::Direct(target)) => assert!(target.varargs),
        other => panic!("expected direct link, got {other:?}"),
    }
}

#[test]
fn test_method_calls_use_extensions_or_dynamic_dispatch() {
    let interner = StringInterner::new();
    let mut builder = ModuleBuilder::new(interner.intern("app"));
    let string = interner.intern("String");
    let shout = interner.intern("shout");
    let receiver = interner.intern("self");
    let obj = interner.intern("obj");

    let ext = define(&mut builder, shout, FunctionScope::Extension, &[receiver], vec![], 0);
    builder.function_mut(ext).set_extension_target(string);

    let literal = string_literal(&interner, 12);
    let static_call = method(&mut builder, literal, shout, vec![], Some(string), 11);
    let static_site = site_of(&static_call);
    let dynamic_call = method(&mut builder, reference(obj, 14), shout, vec![], None, 13);
    let dynamic_site = site_of(&dynamic_call);
    define(
        &mut builder,
        interner.intern("main"),
        FunctionScope::Module,
        &[obj],
        vec![expr_stmt(static_call), expr_stmt(dynamic_call)],
        10,
    );

    let resolved = resolve_last(vec![builder], &interner);
    assert_eq!(resolved.errors, vec![]);
    match resolved.resolutions.get(static_site) {
        Some(Resolution::Direct(target)) => {
            assert_eq!((target.function, target.scope), (ext, FunctionScope::Extension));
        }
        other => panic!("expected extension link, got {other:?}"),
    }
    assert_eq!(
        resolved.resolutions.get(dynamic_site),
        Some(Resolution::Dynamic)
    );
    let order: Vec<CallSiteId> = resolved.resolutions.iter().map(|(site, _)| site).collect();
    assert_eq!(order, vec![static_site, dynamic_site]);
}
