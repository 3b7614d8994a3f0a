//! Local binding verification.
//!
//! The validation/lowering visitor run over a published module. It walks
//! each function with a scope stack, assigns every binding a slot
//! (parameters first, captured slots next, then `let`/`var` bindings in
//! source order) and reports:
//! - E2002 reads or assignments of undeclared names
//! - E2003 assignments to constant bindings
//! - E2004 a name bound twice in the same block
//!
//! The resulting `LocalTable` tells resolution which call sites name a
//! local binding, and tells the emitter how many slots a frame needs.

use rustc_hash::FxHashMap;

use gala_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use gala_ir::visitor::{walk_block, walk_function_invocation, walk_stmt, Visitor};
use gala_ir::{
    BindingKind, Block, CallSiteId, Function, FunctionId, FunctionInvocation, Module, Name, Span,
    Spanned, Stmt, StmtKind, StringInterner,
};

/// Index of a slot within one function's frame.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SlotId(u32);

impl SlotId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a slot came to exist.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SlotOrigin {
    /// User-declared parameter.
    Parameter,
    /// Synthetic parameter holding a captured binding.
    Captured,
    /// `let` or `var` in a block.
    Let,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LocalSlot {
    pub name: Name,
    pub kind: BindingKind,
    pub origin: SlotOrigin,
    pub span: Span,
}

/// Frame layout of one function.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct FunctionLocals {
    slots: Vec<LocalSlot>,
}

impl FunctionLocals {
    pub fn slots(&self) -> &[LocalSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&LocalSlot> {
        self.slots.get(id.index())
    }

    fn push(&mut self, slot: LocalSlot) -> SlotId {
        let id = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("slot table overflow: exceeded u32::MAX locals"));
        self.slots.push(slot);
        SlotId(id)
    }
}

/// Result of local verification for a whole module.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct LocalTable {
    functions: Vec<FunctionLocals>,
    call_bindings: FxHashMap<CallSiteId, (FunctionId, SlotId)>,
}

impl LocalTable {
    pub fn function(&self, id: FunctionId) -> Option<&FunctionLocals> {
        self.functions.get(id.index())
    }

    /// The local binding a call site's name refers to, if one is in scope.
    pub fn binding_at(&self, site: CallSiteId) -> Option<&LocalSlot> {
        let (function, slot) = self.call_bindings.get(&site)?;
        self.function(*function)?.slot(*slot)
    }
}

/// Verify every function of `module`, pushing errors into `queue`.
#[tracing::instrument(level = "debug", skip_all, fields(module = interner.lookup(module.name())))]
pub fn verify_locals(
    module: &Module,
    interner: &StringInterner,
    queue: &mut DiagnosticQueue,
) -> LocalTable {
    let mut checker = LocalsChecker {
        interner,
        queue,
        table: LocalTable::default(),
        current: None,
        scopes: Vec::new(),
    };
    checker.visit_module(module);
    tracing::debug!(
        functions = checker.table.functions.len(),
        call_bindings = checker.table.call_bindings.len(),
        "locals verified"
    );
    checker.table
}

struct LocalsChecker<'a> {
    interner: &'a StringInterner,
    queue: &'a mut DiagnosticQueue,
    table: LocalTable,
    current: Option<(FunctionId, FunctionLocals)>,
    scopes: Vec<FxHashMap<Name, SlotId>>,
}

impl LocalsChecker<'_> {
    fn lookup(&self, name: Name) -> Option<(SlotId, &LocalSlot)> {
        let (_, locals) = self.current.as_ref()?;
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
            .and_then(|id| locals.slot(id).map(|slot| (id, slot)))
    }

    /// Bind `name` in the innermost scope, or report a same-block duplicate.
    fn bind(&mut self, slot: LocalSlot) {
        let Some((_, locals)) = self.current.as_mut() else {
            return;
        };
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if let Some(first) = scope.get(&slot.name).and_then(|&id| locals.slot(id)) {
            self.queue.add(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "`{}` is already bound in this block",
                        self.interner.lookup(slot.name)
                    ))
                    .with_label(slot.span, "bound again here")
                    .with_secondary_label(first.span, "first bound here"),
            );
            return;
        }
        let name = slot.name;
        let id = locals.push(slot);
        scope.insert(name, id);
    }

    fn undeclared(&mut self, name: Name, span: Span) {
        self.queue.add(
            Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "cannot find `{}` in this scope",
                    self.interner.lookup(name)
                ))
                .with_label(span, "not declared"),
        );
    }
}

impl<'ir> Visitor<'ir> for LocalsChecker<'_> {
    fn visit_function(&mut self, id: FunctionId, function: &'ir Function) {
        self.current = Some((id, FunctionLocals::default()));
        self.scopes = vec![FxHashMap::default()];

        let user = function.user_arity();
        for (index, &name) in function.params().iter().enumerate() {
            let (kind, origin) = if index < user {
                (BindingKind::Variable, SlotOrigin::Parameter)
            } else {
                (BindingKind::Constant, SlotOrigin::Captured)
            };
            self.bind(LocalSlot {
                name,
                kind,
                origin,
                span: function.span(),
            });
        }

        if let Some(block) = function.body().block() {
            self.visit_block(block);
        }

        self.scopes.clear();
        if let Some((_, locals)) = self.current.take() {
            self.table.functions.push(locals);
        }
    }

    fn visit_block(&mut self, block: &'ir Block) {
        self.scopes.push(FxHashMap::default());
        walk_block(self, block);
        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &'ir Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, kind, value } => {
                self.visit_expr(value);
                self.bind(LocalSlot {
                    name: *name,
                    kind: *kind,
                    origin: SlotOrigin::Let,
                    span: stmt.span,
                });
            }
            StmtKind::Assign { name, value } => {
                match self.lookup(*name).map(|(_, slot)| (slot.kind, slot.span)) {
                    None => self.undeclared(*name, stmt.span),
                    Some((BindingKind::Constant, bound_at)) => {
                        self.queue.add(
                            Diagnostic::error(ErrorCode::E2003)
                                .with_message(format!(
                                    "cannot assign twice to constant `{}`",
                                    self.interner.lookup(*name)
                                ))
                                .with_label(stmt.span, "assignment to constant")
                                .with_secondary_label(bound_at, "bound as a constant here")
                                .with_note("declare it with `var` to allow reassignment"),
                        );
                    }
                    Some((BindingKind::Variable, _)) => {}
                }
                self.visit_expr(value);
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_function_invocation(&mut self, invocation: &'ir FunctionInvocation) {
        let name = invocation.name();
        match self.lookup(name).map(|(id, _)| id) {
            Some(slot) => {
                if let Some((function, _)) = &self.current {
                    self.table
                        .call_bindings
                        .insert(invocation.call.site, (*function, slot));
                }
            }
            None => {}
        }
        walk_function_invocation(self, invocation);
    }

    fn visit_reference(&mut self, name: Name, span: Span) {
        if self.lookup(name).is_none() {
            self.undeclared(name, span);
        }
    }
}
