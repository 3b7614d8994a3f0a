//! Runtime values.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{DynamicObject, RuntimeError};

/// Argument list of one call. Receiver first for method calls.
pub type Args = SmallVec<[Value; 4]>;

type NativeFn = dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// A value held by a binding or a property.
///
/// Cloning is shallow: strings, callables and objects are shared.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Function(Callable),
    /// A dynamic object method taken as a value, receiver included.
    BoundMethod(BoundMethod),
    Object(DynamicObject),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Function(_) => "function",
            Value::BoundMethod(_) => "method",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&DynamicObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Identity for shared values, structural equality for scalars.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same(b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Function(value)
    }
}

impl From<DynamicObject> for Value {
    fn from(value: DynamicObject) -> Self {
        Value::Object(value)
    }
}

/// A function value.
///
/// `arity` counts every declared parameter. When `varargs` is set the last
/// parameter receives the trailing arguments, so a call passes at least
/// `arity - 1` arguments.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    arity: usize,
    varargs: bool,
    body: Arc<NativeFn>,
}

impl Callable {
    pub fn new<F>(name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Callable {
            name: Arc::from(name),
            arity,
            varargs: false,
            body: Arc::new(body),
        }
    }

    pub fn new_varargs<F>(name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Callable {
            varargs: true,
            ..Callable::new(name, arity, body)
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn is_varargs(&self) -> bool {
        self.varargs
    }

    /// Has a leading parameter that can hold a receiver. A lone varargs
    /// parameter is the trailing-arguments array, not a receiver slot.
    pub fn takes_receiver(&self) -> bool {
        self.arity >= 1 && !(self.varargs && self.arity == 1)
    }

    pub fn accepts(&self, arg_count: usize) -> bool {
        if self.varargs {
            arg_count + 1 >= self.arity
        } else {
            arg_count == self.arity
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if !self.accepts(args.len()) {
            return Err(RuntimeError::WrongArgCount {
                name: self.name.to_string(),
                expected: self.arity,
                found: args.len(),
            });
        }
        (self.body)(args)
    }

    /// Same function value (not merely the same code).
    pub fn same(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Callable({}/{}{})",
            self.name,
            self.arity,
            if self.varargs { "..." } else { "" }
        )
    }
}

/// `receiver.name` captured as a value; calling it dispatches through the
/// receiver's current property.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMethod {
    pub receiver: DynamicObject,
    pub name: Arc<str>,
}
