//! Guarded dispatch stubs.

use std::fmt;
use std::sync::Arc;

use crate::{Callable, InvalidationToken, ObjectId, RuntimeError, Value};

/// What a call site passes: `arity` counts the receiver. `varargs` marks a
/// site whose trailing arguments fill a varargs parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallShape {
    pub arity: usize,
    pub varargs: bool,
}

impl CallShape {
    pub fn new(arity: usize) -> Self {
        CallShape {
            arity,
            varargs: false,
        }
    }

    pub fn varargs(arity: usize) -> Self {
        CallShape {
            arity,
            varargs: true,
        }
    }
}

/// Slow path of a stub, called with the same arguments.
pub type Fallback = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// What a valid stub does.
#[derive(Clone, Debug)]
pub enum Target {
    /// Call the property's function; arguments are passed through.
    Method(Callable),
    /// Return the property's value (getter on data).
    Constant(Value),
    /// Redefine the property on the receiver with the second argument and
    /// return the receiver.
    Define(Arc<str>),
    /// Fail with `PropertyMissing`.
    Missing(Arc<str>),
}

impl Target {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Target::Method(_) => "method",
            Target::Constant(_) => "constant",
            Target::Define(_) => "define",
            Target::Missing(_) => "missing",
        }
    }

    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        match self {
            Target::Method(callable) => callable.call(args),
            Target::Constant(value) => Ok(value.clone()),
            Target::Define(name) => match args {
                [Value::Object(receiver), value] => {
                    receiver.define(name, value.clone())?;
                    Ok(Value::Object(receiver.clone()))
                }
                _ => Err(RuntimeError::WrongArgCount {
                    name: name.to_string(),
                    expected: 2,
                    found: args.len(),
                }),
            },
            Target::Missing(name) => Err(RuntimeError::PropertyMissing {
                name: name.to_string(),
                arguments: args.iter().cloned().collect(),
            }),
        }
    }
}

/// A linked call target plus the guard that keeps it honest.
///
/// Valid while its token is live; a stub only fires for the receiver that
/// issued it. In every other case the fallback runs instead.
#[derive(Clone)]
pub struct DispatchStub {
    token: InvalidationToken,
    owner: ObjectId,
    target: Target,
    fallback: Fallback,
}

impl DispatchStub {
    pub(crate) fn new(
        token: InvalidationToken,
        owner: ObjectId,
        target: Target,
        fallback: Fallback,
    ) -> Self {
        DispatchStub {
            token,
            owner,
            target,
            fallback,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.token.is_valid()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Whether `args` would take the fast path.
    pub fn guard(&self, args: &[Value]) -> bool {
        self.is_valid()
            && matches!(args.first(), Some(Value::Object(receiver)) if receiver.id() == self.owner)
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if self.guard(args) {
            self.target.call(args)
        } else {
            (self.fallback)(args)
        }
    }
}

impl fmt::Debug for DispatchStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchStub")
            .field("owner", &self.owner)
            .field("valid", &self.is_valid())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
