//! Small constructors for hand-built IR in unit tests.

use gala_ir::{
    BinaryOp, BindingKind, Block, CallSiteId, Constant, Expr, ExprKind, FunctionId,
    FunctionInvocation, FunctionScope, MethodInvocation, Name, Span, Stmt, StmtKind, Visibility,
};

use crate::ModuleBuilder;

pub(crate) fn at(start: u32) -> Span {
    Span::new(start, start + 1)
}

pub(crate) fn int(value: i64, start: u32) -> Expr {
    Expr::new(ExprKind::Constant(Constant::Int(value)), at(start))
}

pub(crate) fn reference(name: Name, start: u32) -> Expr {
    Expr::new(ExprKind::Reference(name), at(start))
}

pub(crate) fn closure(id: FunctionId, start: u32) -> Expr {
    Expr::new(ExprKind::Closure(id), at(start))
}

pub(crate) fn add(left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

pub(crate) fn call(
    builder: &mut ModuleBuilder,
    name: Name,
    arguments: Vec<Expr>,
    on_reference: bool,
    start: u32,
) -> Expr {
    let call = builder.named_call(name, arguments, at(start));
    Expr::new(
        ExprKind::FunctionInvocation(FunctionInvocation { call, on_reference }),
        at(start),
    )
}

pub(crate) fn method(
    builder: &mut ModuleBuilder,
    receiver: Expr,
    name: Name,
    arguments: Vec<Expr>,
    receiver_type: Option<Name>,
    start: u32,
) -> Expr {
    let call = builder.named_call(name, arguments, at(start));
    Expr::new(
        ExprKind::MethodInvocation(MethodInvocation {
            receiver: Box::new(receiver),
            call,
            receiver_type,
        }),
        at(start),
    )
}

/// Call site of an invocation expression built by `call` or `method`.
pub(crate) fn site_of(expr: &Expr) -> CallSiteId {
    match &expr.kind {
        ExprKind::FunctionInvocation(invocation) => invocation.call.site,
        ExprKind::MethodInvocation(invocation) => invocation.call.site,
        other => panic!("not an invocation: {other:?}"),
    }
}

pub(crate) fn let_const(name: Name, value: Expr) -> Stmt {
    let span = value.span;
    Stmt::new(
        StmtKind::Let {
            name,
            kind: BindingKind::Constant,
            value,
        },
        span,
    )
}

pub(crate) fn let_var(name: Name, value: Expr) -> Stmt {
    let span = value.span;
    Stmt::new(
        StmtKind::Let {
            name,
            kind: BindingKind::Variable,
            value,
        },
        span,
    )
}

pub(crate) fn assign(name: Name, value: Expr) -> Stmt {
    let span = value.span;
    Stmt::new(StmtKind::Assign { name, value }, span)
}

pub(crate) fn expr_stmt(value: Expr) -> Stmt {
    let span = value.span;
    Stmt::new(StmtKind::Expr(value), span)
}

pub(crate) fn ret(value: Expr) -> Stmt {
    let span = value.span;
    Stmt::new(StmtKind::Return(Some(value)), span)
}

pub(crate) fn nested(statements: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Block(Block::new(statements, Span::DUMMY)), Span::DUMMY)
}

/// Declare a function with user parameters and a body in one step.
pub(crate) fn define(
    builder: &mut ModuleBuilder,
    name: Name,
    scope: FunctionScope,
    params: &[Name],
    body: Vec<Stmt>,
    start: u32,
) -> FunctionId {
    let id = builder.declare(name, Visibility::Public, scope, at(start));
    let function = builder.function_mut(id);
    function.set_parameters(params.iter().copied());
    function.set_body(Block::new(body, at(start)));
    id
}
