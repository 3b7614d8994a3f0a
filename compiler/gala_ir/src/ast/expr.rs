//! Expression nodes and invocation descriptors.

use super::{BinaryOp, UnaryOp};
use crate::{CallSiteId, FunctionId, Name, Span, Spanned};

/// Literal constant.
///
/// Floats are stored as bits so nodes stay `Eq + Hash`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Name),
}

impl Constant {
    pub fn float(value: f64) -> Self {
        Constant::Float(value.to_bits())
    }
}

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Constant(Constant),
    /// Read of a local binding (variable, parameter or captured slot).
    Reference(Name),
    /// A named module function used as a value.
    FunctionRef(Name),
    /// Instantiation of a closure; captured values fill its synthetic slots.
    Closure(FunctionId),
    FunctionInvocation(FunctionInvocation),
    MethodInvocation(MethodInvocation),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// A fresh, empty dynamic object.
    NewObject,
}

/// The shared part of every named call: target name and argument list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NamedCall {
    pub name: Name,
    pub arguments: Vec<Expr>,
    pub site: CallSiteId,
    pub span: Span,
}

impl NamedCall {
    /// Number of arguments written at the call site. Fixed at construction.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

/// `name(args)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionInvocation {
    pub call: NamedCall,
    /// `true` when `name` is a local binding whose current value is called,
    /// rather than a statically known function.
    pub on_reference: bool,
}

impl FunctionInvocation {
    #[inline]
    pub fn name(&self) -> Name {
        self.call.name
    }
}

impl Spanned for FunctionInvocation {
    fn span(&self) -> Span {
        self.call.span
    }
}

/// `receiver.name(args)`.
///
/// Arity counts the explicit arguments only; the receiver is passed as an
/// extra leading argument at run time.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodInvocation {
    pub receiver: Box<Expr>,
    pub call: NamedCall,
    /// Statically known receiver type, when the front end can tell
    /// (e.g. a string literal receiver). Enables extension lookup.
    pub receiver_type: Option<Name>,
}

impl MethodInvocation {
    #[inline]
    pub fn name(&self) -> Name {
        self.call.name
    }
}

impl Spanned for MethodInvocation {
    fn span(&self) -> Span {
        self.call.span
    }
}
