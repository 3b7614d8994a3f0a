//! IR construction: the producer interface.
//!
//! The parser declares every function up front, fills parameters and
//! bodies in through `function_mut`, and allocates one `CallSiteId` per
//! written call. `finish` is the construction pass proper:
//!
//! 1. structural validation (duplicates, varargs placement, missing
//!    bodies, closure nesting), reported as construction errors;
//! 2. closure capture analysis, which appends synthetic parameters;
//! 3. publication of the immutable `Module`.
//!
//! Construction errors abort the unit, so `finish` either publishes a
//! well-formed module or returns every construction error it found.

mod capture;

use rustc_hash::FxHashMap;

use gala_diagnostic::{Diagnostic, ErrorCode};
use gala_ir::visitor::{walk_function, Visitor};
use gala_ir::{
    CallSiteId, Expr, Function, FunctionId, FunctionScope, Module, Name, NamedCall, Span, Spanned,
    StringInterner, Visibility,
};

/// Incremental builder for one compilation unit.
pub struct ModuleBuilder {
    name: Name,
    imports: Vec<Name>,
    functions: Vec<Function>,
    next_call_site: u32,
}

impl ModuleBuilder {
    pub fn new(name: Name) -> Self {
        ModuleBuilder {
            name,
            imports: Vec::new(),
            functions: Vec::new(),
            next_call_site: 0,
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Make the public module functions of `module` visible to this unit.
    pub fn add_import(&mut self, module: Name) {
        if !self.imports.contains(&module) {
            self.imports.push(module);
        }
    }

    /// Create an empty descriptor. Duplicates are detected by `finish`.
    pub fn declare(
        &mut self,
        name: Name,
        visibility: Visibility,
        scope: FunctionScope,
        span: Span,
    ) -> FunctionId {
        let index = u32::try_from(self.functions.len())
            .unwrap_or_else(|_| panic!("function table overflow: exceeded u32::MAX functions"));
        self.functions.push(Function::new(name, visibility, scope, span));
        FunctionId::new(index)
    }

    /// Mutable access to a declared function.
    ///
    /// # Panics
    /// Panics if `id` was not returned by this builder's `declare`.
    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    /// Allocate the identity of one written call.
    pub fn next_call_site(&mut self) -> CallSiteId {
        let site = CallSiteId::new(self.next_call_site);
        self.next_call_site = self
            .next_call_site
            .checked_add(1)
            .unwrap_or_else(|| panic!("call site overflow: exceeded u32::MAX call sites"));
        site
    }

    /// Build a `NamedCall` with a freshly allocated call site.
    pub fn named_call(&mut self, name: Name, arguments: Vec<Expr>, span: Span) -> NamedCall {
        NamedCall {
            name,
            arguments,
            site: self.next_call_site(),
            span,
        }
    }

    /// Validate, analyze captures and publish.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(module = interner.lookup(self.name), functions = self.functions.len())
    )]
    pub fn finish(mut self, interner: &StringInterner) -> Result<Module, Vec<Diagnostic>> {
        let sites = ClosureSites::collect(&self.functions);
        let parents = match self.validate(&sites, interner) {
            Ok(parents) => parents,
            Err(mut errors) => {
                tracing::debug!(errors = errors.len(), "construction failed");
                errors.sort_by_key(|d| d.primary_span().map_or(u32::MAX, |s| s.start));
                return Err(errors);
            }
        };

        for (id, captured) in capture::analyze(&self.functions, &parents) {
            let function = self.function_mut(id);
            tracing::debug!(
                closure = interner.lookup(function.name()),
                captured = captured.len(),
                "closure captures"
            );
            for name in captured {
                function.add_synthetic_parameter(name);
            }
        }

        Ok(Module::new(
            self.name,
            self.imports,
            self.functions,
            self.next_call_site,
        ))
    }

    /// Structural checks. On success, returns the enclosing function of
    /// every closure.
    fn validate(
        &self,
        sites: &ClosureSites,
        interner: &StringInterner,
    ) -> Result<FxHashMap<FunctionId, FunctionId>, Vec<Diagnostic>> {
        let mut errors = Vec::new();

        for site in &sites.sites {
            let is_closure = self
                .function(site.closure)
                .is_some_and(|f| f.scope() == FunctionScope::Closure);
            if !is_closure {
                errors.push(
                    Diagnostic::error(ErrorCode::E1005)
                        .with_message("closure expression does not refer to a closure function")
                        .with_label(site.span, format!("{:?} is not a closure", site.closure)),
                );
            }
        }

        let mut parents = FxHashMap::default();
        for (id, function) in function_ids(&self.functions) {
            let name = interner.lookup(function.name());

            if !function.body().is_complete() {
                errors.push(
                    Diagnostic::error(ErrorCode::E1003)
                        .with_message(format!("function `{name}` has no body"))
                        .with_label(function.span(), "declared here"),
                );
            }

            if function.is_varargs() && function.user_arity() == 0 {
                errors.push(
                    Diagnostic::error(ErrorCode::E1002)
                        .with_message(format!(
                            "varargs function `{name}` declares no parameter to collect into"
                        ))
                        .with_label(function.span(), "declared here")
                        .with_note("the last declared parameter receives the trailing arguments"),
                );
            }

            if function.scope() == FunctionScope::Closure {
                match sites.instantiations(id).as_slice() {
                    [site] => {
                        parents.insert(id, site.parent);
                    }
                    [] => errors.push(
                        Diagnostic::error(ErrorCode::E1004)
                            .with_message(format!("closure `{name}` is never instantiated"))
                            .with_label(function.span(), "declared here")
                            .with_note("a closure must be nested inside exactly one function body"),
                    ),
                    many => {
                        let mut diag = Diagnostic::error(ErrorCode::E1004)
                            .with_message(format!(
                                "closure `{name}` is instantiated {} times",
                                many.len()
                            ))
                            .with_label(function.span(), "declared here");
                        for site in many {
                            diag = diag.with_secondary_label(site.span, "instantiated here");
                        }
                        errors.push(diag);
                    }
                }
            }
        }

        for &closure in parents.keys() {
            if !reaches_root(closure, &parents, &self.functions) {
                if let Some(function) = self.function(closure) {
                    errors.push(
                        Diagnostic::error(ErrorCode::E1004)
                            .with_message(format!(
                                "closure `{}` is not nested inside a module or extension function",
                                interner.lookup(function.name())
                            ))
                            .with_label(function.span(), "declared here"),
                    );
                }
            }
        }

        errors.extend(self.duplicates(&parents, interner));

        if errors.is_empty() {
            Ok(parents)
        } else {
            Err(errors)
        }
    }

    /// Duplicate `(name, scope, extension target, user arity)` within one
    /// enclosing scope.
    fn duplicates(
        &self,
        parents: &FxHashMap<FunctionId, FunctionId>,
        interner: &StringInterner,
    ) -> Vec<Diagnostic> {
        type Key = (Option<FunctionId>, Name, FunctionScope, Option<Name>, usize);
        let mut seen: FxHashMap<Key, Span> = FxHashMap::default();
        let mut errors = Vec::new();
        for (id, function) in function_ids(&self.functions) {
            let key = (
                parents.get(&id).copied(),
                function.name(),
                function.scope(),
                function.extension_target(),
                function.user_arity(),
            );
            if let Some(first) = seen.get(&key) {
                errors.push(
                    Diagnostic::error(ErrorCode::E1001)
                        .with_message(format!(
                            "duplicate {} function `{}` with {} parameter(s)",
                            function.scope(),
                            interner.lookup(function.name()),
                            function.user_arity()
                        ))
                        .with_label(function.span(), "redeclared here")
                        .with_secondary_label(*first, "first declared here"),
                );
            } else {
                seen.insert(key, function.span());
            }
        }
        errors
    }
}

/// Walk the closure parent chain up to a non-closure function.
fn reaches_root(
    closure: FunctionId,
    parents: &FxHashMap<FunctionId, FunctionId>,
    functions: &[Function],
) -> bool {
    let mut current = closure;
    for _ in 0..=functions.len() {
        match parents.get(&current) {
            Some(&parent) => current = parent,
            None => {
                return functions
                    .get(current.index())
                    .is_some_and(|f| f.scope() != FunctionScope::Closure);
            }
        }
    }
    false
}

fn function_ids(functions: &[Function]) -> impl Iterator<Item = (FunctionId, &Function)> {
    functions.iter().enumerate().map(|(index, function)| {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "declare() refuses to grow past u32::MAX functions"
        )]
        let id = FunctionId::new(index as u32);
        (id, function)
    })
}

/// One `Closure(id)` expression.
#[derive(Clone, Copy, Debug)]
struct ClosureSite {
    parent: FunctionId,
    closure: FunctionId,
    span: Span,
}

/// Every closure instantiation in the unit, in source order.
#[derive(Default)]
struct ClosureSites {
    sites: Vec<ClosureSite>,
    current: Option<FunctionId>,
}

impl ClosureSites {
    fn collect(functions: &[Function]) -> Self {
        let mut sites = ClosureSites::default();
        for (id, function) in function_ids(functions) {
            sites.visit_function(id, function);
        }
        sites
    }

    fn instantiations(&self, closure: FunctionId) -> Vec<ClosureSite> {
        self.sites
            .iter()
            .filter(|site| site.closure == closure)
            .copied()
            .collect()
    }
}

impl<'ir> Visitor<'ir> for ClosureSites {
    fn visit_function(&mut self, id: FunctionId, function: &'ir Function) {
        self.current = Some(id);
        walk_function(self, function);
    }

    fn visit_closure(&mut self, id: FunctionId, span: Span) {
        if let Some(parent) = self.current {
            self.sites.push(ClosureSite {
                parent,
                closure: id,
                span,
            });
        }
    }
}
