//! Gala IR - Intermediate Representation Types
//!
//! This crate contains the tree the Gala front end builds after parsing and
//! the back end walks during code generation:
//! - Spans for source locations
//! - Names for interned identifiers
//! - IR nodes (functions, blocks, statements, expressions, invocations)
//! - The `Visitor` protocol shared by every pass and by the emitter
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`
//! - **Closed node set**: nodes are enums, traversal is an exhaustive `match`
//! - **Publish once**: a `Module` is immutable after construction; passes
//!   attach results in side tables keyed by `FunctionId` / `CallSiteId`

mod ast;
mod ids;
mod interner;
mod name;
mod span;
pub mod visitor;

pub use ast::{
    BinaryOp, BindingKind, Block, Constant, Expr, ExprKind, Function, FunctionBody,
    FunctionInvocation, FunctionScope, MethodInvocation, Module, NamedCall, Stmt, StmtKind,
    UnaryOp, Visibility,
};
pub use ids::{CallSiteId, FunctionId};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;

/// Trait for types that have a source location span.
pub trait Spanned {
    /// Get the source location span.
    fn span(&self) -> Span;
}
