use super::*;
use crate::StringInterner;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn names(interner: &StringInterner, raw: &[&str]) -> Vec<Name> {
    raw.iter().map(|s| interner.intern(s)).collect()
}

#[test]
fn test_new_function_is_incomplete() {
    let interner = StringInterner::new();
    let f = Function::new(
        interner.intern("main"),
        Visibility::Public,
        FunctionScope::Module,
        Span::new(0, 10),
    );
    assert!(!f.body().is_complete());
    assert_eq!(f.arity(), 0);
    assert_eq!(f.user_arity(), 0);
    assert!(!f.is_synthetic());
}

#[test]
fn test_arity_counts_synthetic_slots() {
    let interner = StringInterner::new();
    let mut f = Function::new(
        interner.intern("__closure_0"),
        Visibility::Local,
        FunctionScope::Closure,
        Span::DUMMY,
    );
    f.set_parameters(names(&interner, &["a", "b"]));
    f.add_synthetic_parameter(interner.intern("captured"));

    assert_eq!(f.arity(), 3);
    assert_eq!(f.synthetic_parameter_count(), 1);
    assert_eq!(f.user_arity(), 2);
    assert_eq!(f.user_params(), names(&interner, &["a", "b"]).as_slice());
    assert_eq!(f.synthetic_params(), names(&interner, &["captured"]).as_slice());
}

#[test]
fn test_user_params_stay_before_synthetic_suffix() {
    let interner = StringInterner::new();
    let mut f = Function::new(
        interner.intern("f"),
        Visibility::Local,
        FunctionScope::Closure,
        Span::DUMMY,
    );
    f.add_synthetic_parameter(interner.intern("env"));
    f.set_parameters(names(&interner, &["x"]));

    assert_eq!(f.params(), names(&interner, &["x", "env"]).as_slice());
    assert_eq!(f.user_arity(), 1);
}

#[test]
fn test_accepts_exact_and_varargs() {
    let interner = StringInterner::new();
    let mut f = Function::new(
        interner.intern("log"),
        Visibility::Public,
        FunctionScope::Module,
        Span::DUMMY,
    );
    f.set_parameters(names(&interner, &["level", "rest"]));
    assert!(f.accepts(2));
    assert!(!f.accepts(1));
    assert!(!f.accepts(3));

    f.set_varargs(true);
    assert!(f.accepts(1));
    assert!(f.accepts(2));
    assert!(f.accepts(5));
    assert!(!f.accepts(0));
}

#[test]
fn test_set_body_completes_function() {
    let interner = StringInterner::new();
    let mut f = Function::new(
        interner.intern("main"),
        Visibility::Public,
        FunctionScope::Module,
        Span::DUMMY,
    );
    f.set_body(Block::default());
    assert!(f.body().is_complete());
    assert_eq!(f.body().block(), Some(&Block::default()));
}

#[test]
fn test_compiler_generated_flag() {
    let interner = StringInterner::new();
    let mut f = Function::new(
        interner.intern("__closure_0"),
        Visibility::Local,
        FunctionScope::Closure,
        Span::DUMMY,
    );
    f.set_synthetic(true);
    assert!(f.is_synthetic());
    assert!(format!("{f:?}").contains("synthetic: true"));
    f.set_synthetic(false);
    assert!(!f.is_synthetic());
}

proptest! {
    #[test]
    fn prop_user_arity_is_declared_count(user in 0usize..8, synthetic in 0usize..8) {
        let interner = StringInterner::new();
        let mut f = Function::new(
            interner.intern("f"),
            Visibility::Local,
            FunctionScope::Closure,
            Span::DUMMY,
        );
        for i in 0..synthetic {
            f.add_synthetic_parameter(interner.intern(&format!("s{i}")));
        }
        f.set_parameters((0..user).map(|i| interner.intern(&format!("p{i}"))));

        prop_assert!(f.synthetic_parameter_count() <= f.arity());
        prop_assert_eq!(f.arity() - f.synthetic_parameter_count(), user);
        prop_assert_eq!(f.user_arity(), user);
    }
}
