//! Closure capture analysis.
//!
//! A binding is free in a function when it is read, assigned or called
//! without being bound in that function. Free bindings
//! of a nested closure are free in its parent too, unless the parent has
//! them in scope at the instantiation site.
//!
//! A closure captures a free binding when its parent can supply it: the
//! parent has it in scope at the site, or captured it itself. Captures keep
//! first-occurrence order and become trailing synthetic parameters.
//! Anything left over is either a plain call, left to resolution, or an
//! undeclared reference, reported later by local verification.

use rustc_hash::{FxHashMap, FxHashSet};

use gala_ir::visitor::{walk_block, walk_function_invocation, walk_stmt, Visitor};
use gala_ir::{Block, Function, FunctionId, FunctionInvocation, Name, Span, Stmt, StmtKind};

/// Captured names per closure, in declaration order of the closures.
///
/// `parents` must map every closure to its enclosing function, with every
/// parent chain ending at a non-closure function.
pub(super) fn analyze(
    functions: &[Function],
    parents: &FxHashMap<FunctionId, FunctionId>,
) -> Vec<(FunctionId, Vec<Name>)> {
    let mut free = FreeBindings::new(functions);
    for (id, _) in super::function_ids(functions) {
        free.free_in(id);
    }

    let mut resolved: FxHashMap<FunctionId, Vec<Name>> = FxHashMap::default();
    let mut closures: Vec<FunctionId> = parents.keys().copied().collect();
    closures.sort_unstable();
    for &closure in &closures {
        captures_of(closure, parents, &free, &mut resolved);
    }

    closures
        .into_iter()
        .filter_map(|id| resolved.remove(&id).map(|names| (id, names)))
        .filter(|(_, names)| !names.is_empty())
        .collect()
}

fn captures_of(
    closure: FunctionId,
    parents: &FxHashMap<FunctionId, FunctionId>,
    free: &FreeBindings<'_>,
    resolved: &mut FxHashMap<FunctionId, Vec<Name>>,
) -> Vec<Name> {
    if let Some(done) = resolved.get(&closure) {
        return done.clone();
    }
    let Some(&parent) = parents.get(&closure) else {
        return Vec::new();
    };
    let from_parent = captures_of(parent, parents, free, resolved);
    let at_site = free.bound_at_site.get(&closure);
    let captured: Vec<Name> = free
        .free_names(closure)
        .iter()
        .copied()
        .filter(|name| {
            at_site.is_some_and(|bound| bound.contains(name)) || from_parent.contains(name)
        })
        .collect();
    resolved.insert(closure, captured.clone());
    captured
}

/// Free bindings per function, computed on demand.
struct FreeBindings<'ir> {
    functions: &'ir [Function],
    free: Vec<Option<Vec<Name>>>,
    active: Vec<bool>,
    /// Free bindings of a closure that its parent has in scope at the site.
    bound_at_site: FxHashMap<FunctionId, Vec<Name>>,
}

impl<'ir> FreeBindings<'ir> {
    fn new(functions: &'ir [Function]) -> Self {
        FreeBindings {
            functions,
            free: vec![None; functions.len()],
            active: vec![false; functions.len()],
            bound_at_site: FxHashMap::default(),
        }
    }

    fn free_names(&self, id: FunctionId) -> &[Name] {
        self.free
            .get(id.index())
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    fn free_in(&mut self, id: FunctionId) -> Vec<Name> {
        if let Some(Some(done)) = self.free.get(id.index()) {
            return done.clone();
        }
        let functions = self.functions;
        let Some(function) = functions.get(id.index()) else {
            return Vec::new();
        };
        // A closure instantiating itself; validation has already rejected it.
        if self.active[id.index()] {
            return Vec::new();
        }
        self.active[id.index()] = true;

        let mut scan = Scan {
            owner: self,
            scopes: vec![function.params().iter().copied().collect()],
            free: Vec::new(),
        };
        scan.visit_function(id, function);
        let free = scan.free;

        self.active[id.index()] = false;
        self.free[id.index()] = Some(free.clone());
        free
    }
}

/// Scope-tracking walk over one function body.
struct Scan<'a, 'ir> {
    owner: &'a mut FreeBindings<'ir>,
    scopes: Vec<FxHashSet<Name>>,
    free: Vec<Name>,
}

impl Scan<'_, '_> {
    fn is_bound(&self, name: Name) -> bool {
        self.scopes.iter().any(|scope| scope.contains(&name))
    }

    fn use_name(&mut self, name: Name) {
        if !self.is_bound(name) && !self.free.contains(&name) {
            self.free.push(name);
        }
    }
}

impl<'ir> Visitor<'ir> for Scan<'_, 'ir> {
    fn visit_block(&mut self, block: &'ir Block) {
        self.scopes.push(FxHashSet::default());
        walk_block(self, block);
        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &'ir Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, value, .. } => {
                self.visit_expr(value);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(*name);
                }
            }
            StmtKind::Assign { name, value } => {
                self.use_name(*name);
                self.visit_expr(value);
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_function_invocation(&mut self, invocation: &'ir FunctionInvocation) {
        self.use_name(invocation.name());
        walk_function_invocation(self, invocation);
    }

    fn visit_reference(&mut self, name: Name, _span: Span) {
        self.use_name(name);
    }

    fn visit_closure(&mut self, id: FunctionId, _span: Span) {
        let inner = self.owner.free_in(id);
        let mut here = Vec::new();
        for name in inner {
            if self.is_bound(name) {
                here.push(name);
            } else {
                self.use_name(name);
            }
        }
        self.owner.bound_at_site.insert(id, here);
    }
}
