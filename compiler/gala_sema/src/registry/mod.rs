//! Function and extension registries.
//!
//! Explicit lookup tables owned by one `CompilationSession`, populated by
//! `Registries::register_module` as units are published and consulted by
//! resolution. Nothing here is process global.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use gala_ir::{Function, FunctionId, FunctionScope, Module, Name, Visibility};

/// Thread-safe mutable shared registry wrapper.
///
/// Uses `Arc<RwLock<T>>` internally; clones share the same registry.
pub struct SharedMutableRegistry<T>(Arc<parking_lot::RwLock<T>>);

impl<T> SharedMutableRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedMutableRegistry(Arc::new(parking_lot::RwLock::new(registry)))
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.0.write()
    }
}

impl<T> Clone for SharedMutableRegistry<T> {
    fn clone(&self) -> Self {
        SharedMutableRegistry(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedMutableRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedMutableRegistry({:?})", &*self.0.read())
    }
}

/// What resolution needs to know about a registered function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionEntry {
    pub module: Name,
    pub function: FunctionId,
    pub name: Name,
    pub visibility: Visibility,
    pub scope: FunctionScope,
    pub user_arity: usize,
    pub varargs: bool,
}

impl FunctionEntry {
    pub fn new(module: Name, id: FunctionId, function: &Function) -> Self {
        FunctionEntry {
            module,
            function: id,
            name: function.name(),
            visibility: function.visibility(),
            scope: function.scope(),
            user_arity: function.user_arity(),
            varargs: function.is_varargs(),
        }
    }

    /// Same rule as `Function::accepts`.
    pub fn accepts(&self, arg_count: usize) -> bool {
        if self.varargs {
            arg_count + 1 >= self.user_arity
        } else {
            arg_count == self.user_arity
        }
    }

    /// Visible from a unit other than the defining one.
    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Public && self.scope == FunctionScope::Module
    }

    fn visible_from(&self, unit: Name) -> bool {
        self.module == unit || self.visibility == Visibility::Public
    }
}

/// Exact arity first, then varargs.
fn best_match<'a>(
    candidates: impl Iterator<Item = &'a FunctionEntry> + Clone,
    arg_count: usize,
) -> Option<FunctionEntry> {
    let mut exact = candidates.clone();
    let mut spread = candidates;
    exact
        .find(|e| !e.varargs && e.user_arity == arg_count)
        .or_else(|| spread.find(|e| e.varargs && e.accepts(arg_count)))
        .copied()
}

/// MODULE-scope functions, by defining unit.
#[derive(Default, Debug)]
pub struct FunctionRegistry {
    by_module: FxHashMap<Name, Vec<FunctionEntry>>,
}

impl FunctionRegistry {
    pub fn register(&mut self, entry: FunctionEntry) {
        self.by_module.entry(entry.module).or_default().push(entry);
    }

    pub fn module_functions(&self, module: Name) -> &[FunctionEntry] {
        self.by_module.get(&module).map_or(&[][..], Vec::as_slice)
    }

    /// Find the target of `name(args)` written in unit `from`.
    ///
    /// The calling unit's own functions match at any visibility; imported
    /// units contribute only exported functions.
    pub fn lookup(
        &self,
        from: Name,
        imports: &[Name],
        name: Name,
        arg_count: usize,
    ) -> Option<FunctionEntry> {
        let own = self.module_functions(from).iter();
        let imported = imports
            .iter()
            .filter(|&&module| module != from)
            .flat_map(|&module| self.module_functions(module))
            .filter(|e| e.is_exported());
        best_match(own.chain(imported).filter(|e| e.name == name), arg_count)
    }

    pub fn len(&self) -> usize {
        self.by_module.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// EXTENSION-scope functions, keyed by `(receiver type, name)`.
///
/// The receiver is the extension function's first user parameter, so a
/// method call with `n` arguments looks for arity `n + 1`.
#[derive(Default, Debug)]
pub struct ExtensionRegistry {
    by_target: FxHashMap<(Name, Name), Vec<FunctionEntry>>,
}

impl ExtensionRegistry {
    pub fn register(&mut self, receiver_type: Name, entry: FunctionEntry) {
        self.by_target
            .entry((receiver_type, entry.name))
            .or_default()
            .push(entry);
    }

    /// Find the extension for `receiver.name(args)` written in unit `from`.
    pub fn lookup(
        &self,
        from: Name,
        receiver_type: Name,
        name: Name,
        arg_count: usize,
    ) -> Option<FunctionEntry> {
        let candidates = self
            .by_target
            .get(&(receiver_type, name))
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter(|e| e.visible_from(from));
        best_match(candidates, arg_count + 1)
    }

    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every registry of one compilation session.
#[derive(Default, Debug)]
pub struct Registries {
    pub functions: FunctionRegistry,
    pub extensions: ExtensionRegistry,
}

impl Registries {
    /// Register the MODULE and EXTENSION functions of a published unit.
    /// Closures are never registered: they are not visible by name.
    pub fn register_module(&mut self, module: &Module) {
        let unit = module.name();
        for (id, function) in module.iter_functions() {
            let entry = FunctionEntry::new(unit, id, function);
            match function.scope() {
                FunctionScope::Module => self.functions.register(entry),
                FunctionScope::Extension => {
                    if let Some(target) = function.extension_target() {
                        self.extensions.register(target, entry);
                    }
                }
                FunctionScope::Closure => {}
            }
        }
        tracing::debug!(
            module = unit.raw(),
            functions = self.functions.len(),
            extensions = self.extensions.len(),
            "registered module"
        );
    }
}
