//! Compilation unit.

use std::fmt;

use super::Function;
use crate::{FunctionId, Name};

/// A published compilation unit.
///
/// Owns its functions (closures included). Only shared access is exposed:
/// once a `Module` exists its descriptors can no longer be edited.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Module {
    name: Name,
    imports: Vec<Name>,
    functions: Vec<Function>,
    call_site_count: u32,
}

impl Module {
    /// Publish a module. Called by the construction pass once every
    /// descriptor is final.
    pub fn new(
        name: Name,
        imports: Vec<Name>,
        functions: Vec<Function>,
        call_site_count: u32,
    ) -> Self {
        Module {
            name,
            imports,
            functions,
            call_site_count,
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    /// Modules whose public functions are visible from this one.
    #[inline]
    pub fn imports(&self) -> &[Name] {
        &self.imports
    }

    #[inline]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    /// Functions paired with their ids, in declaration order.
    pub fn iter_functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions.iter().enumerate().map(|(index, function)| {
            // Construction never produces more than u32::MAX functions.
            #[expect(
                clippy::cast_possible_truncation,
                reason = "function count is bounded by the builder's u32 ids"
            )]
            let id = FunctionId::new(index as u32);
            (id, function)
        })
    }

    /// Number of call sites; every `CallSiteId` in the module is below it.
    #[inline]
    pub fn call_site_count(&self) -> u32 {
        self.call_site_count
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module {{ name: {:?}, {} imports, {} functions, {} call sites }}",
            self.name,
            self.imports.len(),
            self.functions.len(),
            self.call_site_count
        )
    }
}
