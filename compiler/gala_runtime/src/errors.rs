//! Runtime errors.
//!
//! `LinkError` is raised by `DynamicObject::link` when a found property
//! cannot serve the call site's shape. `RuntimeError` covers everything
//! raised while a call executes, link errors included.

use crate::Args;

/// Binding error between a call site and a property, raised at link time.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LinkError {
    #[error("`{name}` must take the dynamic object as its first, non-varargs parameter")]
    MissingReceiver { name: String },
    #[error("`{name}` takes {found} parameter(s) but the call site passes {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("`{name}` signature mismatch: call site varargs={expected}, property varargs={found}")]
    SignatureMismatch {
        name: String,
        expected: bool,
        found: bool,
    },
    #[error("`{name}` is a data property and cannot be called with {arity} argument(s)")]
    DataArity { name: String, arity: usize },
}

impl LinkError {
    /// The property the call site asked for.
    pub fn property(&self) -> &str {
        match self {
            LinkError::MissingReceiver { name }
            | LinkError::ArityMismatch { name, .. }
            | LinkError::SignatureMismatch { name, .. }
            | LinkError::DataArity { name, .. } => name,
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("cannot change `{name}`: the object is frozen")]
    Frozen { name: String },
    #[error("missing dynamic object definition for `{name}` (called with {} argument(s))", .arguments.len())]
    PropertyMissing { name: String, arguments: Args },
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("a `{type_name}` value is not callable")]
    NotCallable { type_name: &'static str },
    #[error("`{name}` expects {expected} argument(s), got {found}")]
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("`{name}` must be called on a dynamic object, got a `{type_name}` value")]
    NotADynamicObject {
        name: String,
        type_name: &'static str,
    },
    #[error("the call site for `{name}` no longer exists")]
    CallSiteDropped { name: String },
}
