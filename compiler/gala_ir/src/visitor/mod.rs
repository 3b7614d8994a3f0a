//! IR Visitor Pattern
//!
//! The single traversal protocol between the IR and everything that reads
//! it: the validation and resolution passes in `gala_sema`, and the
//! external emitter.
//!
//! # Design
//!
//! Nodes are closed enums, so dispatch is a `match` in the `walk_*`
//! functions rather than an `accept` method per node type. A visitor
//! overrides the `visit_*` hooks it cares about and calls the matching
//! `walk_*` function to keep descending. The IR is never mutated; the
//! visitor owns whatever state it builds.
//!
//! Closure bodies are module functions. `visit_closure` only reports the
//! instantiation site; the body is reached through `visit_function`.
//!
//! # Example
//!
//! ```text
//! struct CountCalls {
//!     count: usize,
//! }
//!
//! impl<'ir> Visitor<'ir> for CountCalls {
//!     fn visit_function_invocation(&mut self, call: &'ir FunctionInvocation) {
//!         self.count += 1;
//!         walk_function_invocation(self, call);
//!     }
//! }
//! ```

use crate::ast::{
    Block, Constant, Expr, ExprKind, Function, FunctionBody, FunctionInvocation, MethodInvocation,
    Module, Stmt, StmtKind,
};
use crate::{FunctionId, Name, Span};

/// IR Visitor trait.
///
/// Override `visit_*` methods to add custom behavior at specific nodes.
/// Call `walk_*` functions to continue traversal into children.
pub trait Visitor<'ir> {
    fn visit_module(&mut self, module: &'ir Module) {
        walk_module(self, module);
    }

    fn visit_function(&mut self, id: FunctionId, function: &'ir Function) {
        let _ = id;
        walk_function(self, function);
    }

    fn visit_block(&mut self, block: &'ir Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ir Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ir Expr) {
        walk_expr(self, expr);
    }

    fn visit_function_invocation(&mut self, invocation: &'ir FunctionInvocation) {
        walk_function_invocation(self, invocation);
    }

    fn visit_method_invocation(&mut self, invocation: &'ir MethodInvocation) {
        walk_method_invocation(self, invocation);
    }

    /// A read of a local binding. Leaf.
    fn visit_reference(&mut self, name: Name, span: Span) {
        let _ = (name, span);
    }

    /// A closure instantiation. Leaf; see the module docs.
    fn visit_closure(&mut self, id: FunctionId, span: Span) {
        let _ = (id, span);
    }

    fn visit_constant(&mut self, constant: &'ir Constant, span: Span) {
        let _ = (constant, span);
    }
}

// Walk Functions
//
// Children are visited depth-first, left to right, in source order.

/// Walk every function of a module in declaration order.
pub fn walk_module<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, module: &'ir Module) {
    for (id, function) in module.iter_functions() {
        visitor.visit_function(id, function);
    }
}

/// Walk a function body. Incomplete functions have nothing to walk.
pub fn walk_function<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, function: &'ir Function) {
    match function.body() {
        FunctionBody::Block(block) => visitor.visit_block(block),
        FunctionBody::Incomplete => {}
    }
}

pub fn walk_block<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, block: &'ir Block) {
    for stmt in &block.statements {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, stmt: &'ir Stmt) {
    match &stmt.kind {
        StmtKind::Let { value, .. } | StmtKind::Assign { value, .. } | StmtKind::Expr(value) => {
            visitor.visit_expr(value);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_block(then_block);
            if let Some(else_block) = else_block {
                visitor.visit_block(else_block);
            }
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(condition);
            visitor.visit_block(body);
        }
        StmtKind::Block(block) => visitor.visit_block(block),
    }
}

pub fn walk_expr<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, expr: &'ir Expr) {
    match &expr.kind {
        ExprKind::Constant(constant) => visitor.visit_constant(constant, expr.span),
        ExprKind::Reference(name) => visitor.visit_reference(*name, expr.span),
        ExprKind::Closure(id) => visitor.visit_closure(*id, expr.span),
        ExprKind::FunctionInvocation(invocation) => visitor.visit_function_invocation(invocation),
        ExprKind::MethodInvocation(invocation) => visitor.visit_method_invocation(invocation),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::FunctionRef(_) | ExprKind::NewObject => {}
    }
}

pub fn walk_function_invocation<'ir, V: Visitor<'ir> + ?Sized>(
    visitor: &mut V,
    invocation: &'ir FunctionInvocation,
) {
    for argument in &invocation.call.arguments {
        visitor.visit_expr(argument);
    }
}

/// Walk the receiver, then the arguments.
pub fn walk_method_invocation<'ir, V: Visitor<'ir> + ?Sized>(
    visitor: &mut V,
    invocation: &'ir MethodInvocation,
) {
    visitor.visit_expr(&invocation.receiver);
    for argument in &invocation.call.arguments {
        visitor.visit_expr(argument);
    }
}
