//! Function and closure descriptors.
//!
//! A `Function` is created once per declaration by the construction pass,
//! filled in incrementally through `&mut` access, and frozen when its
//! `Module` is published (the module only hands out `&Function`).

use std::fmt;

use super::{Block, FunctionScope, Visibility};
use crate::{Name, Span, Spanned};

/// The body of a function.
///
/// A declaration whose body was never attached stays `Incomplete`; the
/// construction pass reports it instead of emitting code for it.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FunctionBody {
    #[default]
    Incomplete,
    Block(Block),
}

impl FunctionBody {
    pub fn block(&self) -> Option<&Block> {
        match self {
            FunctionBody::Block(block) => Some(block),
            FunctionBody::Incomplete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FunctionBody::Block(_))
    }
}

/// Function descriptor.
///
/// # Parameters
/// `params` holds every slot of the calling convention. The trailing
/// `synthetic_param_count` entries are compiler inserted (captured
/// variables of a closure) and are not part of the user-visible arity.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Function {
    name: Name,
    visibility: Visibility,
    scope: FunctionScope,
    params: Vec<Name>,
    synthetic_param_count: usize,
    varargs: bool,
    synthetic: bool,
    /// Receiver type of an `Extension` function.
    extension_target: Option<Name>,
    body: FunctionBody,
    span: Span,
}

impl Function {
    pub fn new(name: Name, visibility: Visibility, scope: FunctionScope, span: Span) -> Self {
        Function {
            name,
            visibility,
            scope,
            params: Vec::new(),
            synthetic_param_count: 0,
            varargs: false,
            synthetic: false,
            extension_target: None,
            body: FunctionBody::Incomplete,
            span,
        }
    }

    // Builders (construction pass only)

    /// Append user-declared parameters.
    ///
    /// User parameters always precede synthetic ones, even when captures
    /// were recorded first.
    pub fn set_parameters(&mut self, names: impl IntoIterator<Item = Name>) {
        let user_end = self.user_arity();
        let tail = self.params.split_off(user_end);
        self.params.extend(names);
        self.params.extend(tail);
    }

    /// Append a compiler-inserted parameter slot.
    pub fn add_synthetic_parameter(&mut self, name: Name) {
        self.params.push(name);
        self.synthetic_param_count += 1;
    }

    pub fn set_varargs(&mut self, varargs: bool) {
        self.varargs = varargs;
    }

    pub fn set_synthetic(&mut self, synthetic: bool) {
        self.synthetic = synthetic;
    }

    pub fn set_extension_target(&mut self, target: Name) {
        self.extension_target = Some(target);
    }

    pub fn set_body(&mut self, block: Block) {
        self.body = FunctionBody::Block(block);
    }

    // Accessors

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn scope(&self) -> FunctionScope {
        self.scope
    }

    /// All parameter slots, synthetic suffix included.
    #[inline]
    pub fn params(&self) -> &[Name] {
        &self.params
    }

    /// The user-declared parameters.
    #[inline]
    pub fn user_params(&self) -> &[Name] {
        &self.params[..self.user_arity()]
    }

    /// The compiler-inserted parameter slots.
    #[inline]
    pub fn synthetic_params(&self) -> &[Name] {
        &self.params[self.user_arity()..]
    }

    #[inline]
    pub fn synthetic_parameter_count(&self) -> usize {
        self.synthetic_param_count
    }

    /// Total slot count, synthetic slots included.
    ///
    /// This is what the calling convention needs. Diagnostics and call-site
    /// matching want `user_arity()`.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Arity as written by the user.
    #[inline]
    pub fn user_arity(&self) -> usize {
        self.params.len() - self.synthetic_param_count
    }

    #[inline]
    pub fn is_varargs(&self) -> bool {
        self.varargs
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    #[inline]
    pub fn extension_target(&self) -> Option<Name> {
        self.extension_target
    }

    #[inline]
    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    /// Check whether a call with `arg_count` user arguments fits this
    /// function's declared signature.
    pub fn accepts(&self, arg_count: usize) -> bool {
        let arity = self.user_arity();
        if self.varargs {
            arg_count + 1 >= arity
        } else {
            arg_count == arity
        }
    }
}

impl Spanned for Function {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function {{ name: {:?}, {:?}, {}, params: {:?}, synthetic_params: {}, varargs: {}, synthetic: {}, complete: {} }}",
            self.name,
            self.visibility,
            self.scope,
            self.params,
            self.synthetic_param_count,
            self.varargs,
            self.synthetic,
            self.body.is_complete()
        )
    }
}

#[cfg(test)]
mod tests;
