//! Dynamic objects.
//!
//! A `DynamicObject` is a shared handle to a property table whose entries
//! can be added, replaced and removed while code runs. Call sites bind to
//! properties through [`DynamicObject::link`], which hands out a stub
//! guarded by an [`InvalidationToken`]. Changing a property invalidates
//! every token issued for that name and no other.
//!
//! # Locking
//!
//! - Mutations and `link` serialize on the per-object token mutex.
//! - The property table is a copy-on-write snapshot. `get` clones the
//!   snapshot pointer and never waits on a mutation in progress.
//! - Tokens for a name are invalidated under the mutex before the new
//!   snapshot is published, so a re-link cannot pair the old value with a
//!   fresh token.
//! - No operation holds the locks of two objects.

mod token;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::stub::{CallShape, DispatchStub, Fallback, Target};
use crate::{BoundMethod, Callable, LinkError, RuntimeError, Value};

pub use token::InvalidationToken;
use token::TokenSet;

type PropertyMap = FxHashMap<Arc<str>, Value>;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique object identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct ObjectId(u64);

impl ObjectId {
    fn fresh() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ObjectInner {
    id: ObjectId,
    properties: RwLock<Arc<PropertyMap>>,
    /// A name has an entry iff it was defined or linked at least once.
    tokens: Mutex<FxHashMap<Arc<str>, TokenSet>>,
    frozen: AtomicBool,
}

/// Shared handle to a dynamic object. Clones refer to the same object.
#[derive(Clone)]
pub struct DynamicObject {
    inner: Arc<ObjectInner>,
}

impl DynamicObject {
    pub fn new() -> Self {
        Self::with_properties(Arc::default(), FxHashMap::default())
    }

    fn with_properties(
        properties: Arc<PropertyMap>,
        tokens: FxHashMap<Arc<str>, TokenSet>,
    ) -> Self {
        DynamicObject {
            inner: Arc::new(ObjectInner {
                id: ObjectId::fresh(),
                properties: RwLock::new(properties),
                tokens: Mutex::new(tokens),
                frozen: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> Arc<PropertyMap> {
        Arc::clone(&self.inner.properties.read())
    }

    /// Replace the property table. Caller holds the token mutex.
    fn publish(&self, properties: PropertyMap) {
        *self.inner.properties.write() = Arc::new(properties);
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.snapshot().get(name).cloned()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.snapshot().contains_key(name)
    }

    /// Every binding, sorted by name.
    pub fn properties(&self) -> Vec<(Arc<str>, Value)> {
        let mut properties: Vec<_> = self
            .snapshot()
            .iter()
            .map(|(name, value)| (Arc::clone(name), value.clone()))
            .collect();
        properties.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        properties
    }

    /// Bind `name` to `value`, invalidating every stub linked to `name`.
    pub fn define(&self, name: &str, value: impl Into<Value>) -> Result<&Self, RuntimeError> {
        let value = value.into();
        let mut tokens = self.inner.tokens.lock();
        if self.is_frozen() {
            return Err(RuntimeError::Frozen {
                name: name.to_string(),
            });
        }
        let key = invalidate_name(self.id(), &mut tokens, name);
        let mut properties = PropertyMap::clone(&self.snapshot());
        properties.insert(key, value);
        self.publish(properties);
        Ok(self)
    }

    /// Remove `name`. Stubs linked to it are invalidated; removing an
    /// absent name changes nothing.
    pub fn undefine(&self, name: &str) -> Result<&Self, RuntimeError> {
        let mut tokens = self.inner.tokens.lock();
        if self.is_frozen() {
            return Err(RuntimeError::Frozen {
                name: name.to_string(),
            });
        }
        let snapshot = self.snapshot();
        if snapshot.contains_key(name) {
            let mut properties = PropertyMap::clone(&snapshot);
            properties.remove(name);
            if let Some(set) = tokens.get_mut(name) {
                log_invalidated(self.id(), name, set.invalidate_all());
            }
            self.publish(properties);
        }
        Ok(self)
    }

    /// Make the object immutable. Irreversible; freezing twice is a no-op.
    pub fn freeze(&self) -> &Self {
        let _tokens = self.inner.tokens.lock();
        self.inner.frozen.store(true, Ordering::Release);
        self
    }

    /// A new, unfrozen object with the same bindings and no linked stubs.
    pub fn copy(&self) -> DynamicObject {
        let properties = self.snapshot();
        let tokens = properties
            .keys()
            .map(|name| (Arc::clone(name), TokenSet::default()))
            .collect();
        DynamicObject::with_properties(properties, tokens)
    }

    /// Define every property of `other` on this object.
    ///
    /// Fails without changing anything when this object is frozen and
    /// `other` has at least one property.
    pub fn mixin(&self, other: &DynamicObject) -> Result<&Self, RuntimeError> {
        let incoming = other.properties();
        let Some((first, _)) = incoming.first() else {
            return Ok(self);
        };
        let mut tokens = self.inner.tokens.lock();
        if self.is_frozen() {
            return Err(RuntimeError::Frozen {
                name: first.to_string(),
            });
        }
        let mut properties = PropertyMap::clone(&self.snapshot());
        for (name, value) in incoming {
            let key = invalidate_name(self.id(), &mut tokens, &name);
            properties.insert(key, value);
        }
        self.publish(properties);
        Ok(self)
    }

    /// `self.name` as a callable value.
    pub fn bind(&self, name: &str) -> Value {
        Value::BoundMethod(BoundMethod {
            receiver: self.clone(),
            name: Arc::from(name),
        })
    }

    /// Live tokens issued for `name`.
    pub fn live_tokens(&self, name: &str) -> usize {
        self.inner.tokens.lock().get(name).map_or(0, TokenSet::len)
    }

    /// Whether `name` has ever been defined or linked on this object.
    pub fn is_tracked(&self, name: &str) -> bool {
        self.inner.tokens.lock().contains_key(name)
    }

    /// Bind a call site of `shape` to the current value of `name`.
    ///
    /// - A callable must take the object as a leading, non-varargs
    ///   parameter and match the shape.
    /// - Data answers a getter (arity 1) with the value and a setter
    ///   (arity 2) by redefining the property.
    /// - An absent name answers a setter by defining it; any other shape
    ///   gets a stub that fails with `PropertyMissing` when invoked.
    ///
    /// The stub calls its target only while its token is valid and the
    /// receiver is this object; otherwise it calls `fallback`.
    pub fn link(
        &self,
        name: &str,
        shape: CallShape,
        fallback: Fallback,
    ) -> Result<DispatchStub, LinkError> {
        let mut tokens = self.inner.tokens.lock();
        let target = match self.snapshot().get(name) {
            Some(Value::Function(callable)) => {
                check_method(name, callable, shape)?;
                Target::Method(callable.clone())
            }
            Some(value) => match shape.arity {
                1 => Target::Constant(value.clone()),
                2 => Target::Define(Arc::from(name)),
                arity => {
                    return Err(LinkError::DataArity {
                        name: name.to_string(),
                        arity,
                    })
                }
            },
            None if shape.arity == 2 => Target::Define(Arc::from(name)),
            None => Target::Missing(Arc::from(name)),
        };
        let token = match tokens.get_mut(name) {
            Some(set) => set.issue(),
            None => tokens.entry(Arc::from(name)).or_default().issue(),
        };
        tracing::trace!(
            object = %self.id(),
            name,
            arity = shape.arity,
            target = target.kind(),
            "linked call site"
        );
        Ok(DispatchStub::new(token, self.id(), target, fallback))
    }
}

impl Default for DynamicObject {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DynamicObject {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.properties().into_iter().map(|(name, _)| name).collect();
        f.debug_struct("DynamicObject")
            .field("id", &self.id())
            .field("frozen", &self.is_frozen())
            .field("properties", &names)
            .finish()
    }
}

/// Invalidate the tokens of `name`, creating its entry on first
/// definition. Returns the shared key.
fn invalidate_name(
    object: ObjectId,
    tokens: &mut FxHashMap<Arc<str>, TokenSet>,
    name: &str,
) -> Arc<str> {
    let existing = tokens.get_key_value(name).map(|(key, _)| Arc::clone(key));
    match existing {
        Some(key) => {
            if let Some(set) = tokens.get_mut(name) {
                log_invalidated(object, name, set.invalidate_all());
            }
            key
        }
        None => {
            let key: Arc<str> = Arc::from(name);
            tokens.insert(Arc::clone(&key), TokenSet::default());
            key
        }
    }
}

fn log_invalidated(object: ObjectId, name: &str, count: usize) {
    if count > 0 {
        tracing::debug!(%object, name, tokens = count, "invalidated stubs");
    }
}

fn check_method(name: &str, callable: &Callable, shape: CallShape) -> Result<(), LinkError> {
    if !callable.takes_receiver() {
        return Err(LinkError::MissingReceiver {
            name: name.to_string(),
        });
    }
    if callable.is_varargs() != shape.varargs {
        return Err(LinkError::SignatureMismatch {
            name: name.to_string(),
            expected: shape.varargs,
            found: callable.is_varargs(),
        });
    }
    if !callable.accepts(shape.arity) {
        return Err(LinkError::ArityMismatch {
            name: name.to_string(),
            expected: shape.arity,
            found: callable.arity(),
        });
    }
    Ok(())
}
