//! IR node types.
//!
//! The node set is closed: every construct is a variant of `ExprKind` or
//! `StmtKind`, plus the `Block`, `Function` and `Module` containers.
//! Passes walk it through `crate::visitor`.

mod expr;
mod function;
mod module;
mod stmt;

pub use expr::{Constant, Expr, ExprKind, FunctionInvocation, MethodInvocation, NamedCall};
pub use function::{Function, FunctionBody};
pub use module::Module;
pub use stmt::{Block, Stmt, StmtKind};

use std::fmt;

/// Who may invoke a function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    /// Invocable from other compilation units.
    #[default]
    Public,
    /// Invocable only from the defining compilation unit.
    Local,
}

/// Where a function lives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FunctionScope {
    /// Top-level function of a module.
    Module,
    /// Function attached onto an existing external type.
    Extension,
    /// Nested function capturing its enclosing environment.
    Closure,
}

impl fmt::Display for FunctionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionScope::Module => write!(f, "module"),
            FunctionScope::Extension => write!(f, "extension"),
            FunctionScope::Closure => write!(f, "closure"),
        }
    }
}

/// Whether a local binding may be reassigned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingKind {
    /// `let x = ...`
    Constant,
    /// `var x = ...`
    Variable,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
}
