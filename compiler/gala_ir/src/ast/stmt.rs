//! Statement nodes and blocks.

use super::{BindingKind, Expr};
use crate::{Name, Span, Spanned};

/// A lexical block: a scope for `let`/`var` bindings.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Block { statements, span }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Spanned for Block {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Introduce a binding in the current block.
    Let {
        name: Name,
        kind: BindingKind,
        value: Expr,
    },
    /// Reassign an existing binding.
    Assign { name: Name, value: Expr },
    Expr(Expr),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While { condition: Expr, body: Block },
    Block(Block),
}
