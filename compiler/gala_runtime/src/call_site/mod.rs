//! Call sites generated code dispatches through.
//!
//! A `MethodCallSite` memoizes the last stub it linked. The stub's
//! fallback re-links against whatever receiver reached it and memoizes
//! the new stub, so a site follows redefinitions and receiver changes
//! without any coordination from the objects involved.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::{Args, CallShape, DispatchStub, Fallback, RuntimeError, Value};

struct SiteState {
    name: Arc<str>,
    shape: CallShape,
    cached: RwLock<Option<DispatchStub>>,
    relinks: AtomicUsize,
}

impl SiteState {
    fn relink(self: &Arc<Self>, args: &[Value]) -> Result<Value, RuntimeError> {
        let receiver = match args.first() {
            Some(Value::Object(receiver)) => receiver,
            other => {
                return Err(RuntimeError::NotADynamicObject {
                    name: self.name.to_string(),
                    type_name: other.map_or("nothing", Value::type_name),
                })
            }
        };
        let stub = receiver.link(&self.name, self.shape, self.fallback())?;
        let relinks = self.relinks.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(name = %self.name, relinks, "call site relinked");
        // Linked against this receiver; a racing redefinition must not relink again.
        let result = stub.target().call(args);
        *self.cached.write() = Some(stub);
        result
    }

    /// Re-link through this site while it exists. The stub must not keep
    /// the site alive: the site owns the stub.
    fn fallback(self: &Arc<Self>) -> Fallback {
        let site: Weak<SiteState> = Arc::downgrade(self);
        let name = Arc::clone(&self.name);
        Arc::new(move |args: &[Value]| match site.upgrade() {
            Some(site) => site.relink(args),
            None => Err(RuntimeError::CallSiteDropped {
                name: name.to_string(),
            }),
        })
    }
}

/// `receiver.name(args)` on a dynamic object. Clones share the cache.
#[derive(Clone)]
pub struct MethodCallSite {
    state: Arc<SiteState>,
}

impl MethodCallSite {
    pub fn new(name: &str, shape: CallShape) -> Self {
        MethodCallSite {
            state: Arc::new(SiteState {
                name: Arc::from(name),
                shape,
                cached: RwLock::new(None),
                relinks: AtomicUsize::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn shape(&self) -> CallShape {
        self.state.shape
    }

    /// Call with the receiver as `args[0]`.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let cached = self.state.cached.read().clone();
        match cached {
            Some(stub) => stub.invoke(args),
            None => self.state.relink(args),
        }
    }

    /// How many stubs this site has linked.
    pub fn relink_count(&self) -> usize {
        self.state.relinks.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MethodCallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCallSite")
            .field("name", &self.state.name)
            .field("shape", &self.state.shape)
            .field("relinks", &self.relink_count())
            .finish_non_exhaustive()
    }
}

/// `name(args)` where `name` is a local binding holding a callable.
///
/// Plain functions are called directly. Bound dynamic object methods go
/// through an inner `MethodCallSite`, recreated when the bound name or
/// arity changes.
#[derive(Default, Debug)]
pub struct ReferenceCallSite {
    method: Mutex<Option<MethodCallSite>>,
}

impl ReferenceCallSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoke(&self, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(callable) => callable.call(args),
            Value::BoundMethod(bound) => {
                let mut full = Args::with_capacity(args.len() + 1);
                full.push(Value::Object(bound.receiver.clone()));
                full.extend(args.iter().cloned());
                self.method_site(&bound.name, full.len()).invoke(&full)
            }
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    fn method_site(&self, name: &str, arity: usize) -> MethodCallSite {
        let mut slot = self.method.lock();
        match slot.as_ref() {
            Some(site) if site.name() == name && site.shape().arity == arity => site.clone(),
            _ => {
                let site = MethodCallSite::new(name, CallShape::new(arity));
                *slot = Some(site.clone());
                site
            }
        }
    }
}
