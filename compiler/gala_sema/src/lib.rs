//! Gala semantic passes.
//!
//! Everything between the parser and the emitter:
//! - `ModuleBuilder`: the producer interface. Declarations are filled in
//!   incrementally, then `finish` validates the tree, runs closure capture
//!   analysis and publishes an immutable `Module`.
//! - `verify_locals`: scope checking and slot assignment for every binding.
//! - `resolve_module`: picks direct link, reference dispatch or dynamic
//!   dispatch for every call site.
//! - `CompilationSession`: owns the interner and registries for one
//!   compilation and drives the passes over sibling units.

mod builder;
mod locals;
mod registry;
mod resolve;
mod session;

#[cfg(test)]
mod test_helpers;

pub use builder::ModuleBuilder;
pub use locals::{verify_locals, FunctionLocals, LocalSlot, LocalTable, SlotId, SlotOrigin};
pub use registry::{
    ExtensionRegistry, FunctionEntry, FunctionRegistry, Registries, SharedMutableRegistry,
};
pub use resolve::{resolve_module, FunctionTarget, Resolution, Resolutions};
pub use session::{CompilationSession, CompiledUnit, FailedUnit, SessionConfig};
