//! Index types for side tables over a published module.

use std::fmt;

/// Index of a function within its `Module`.
///
/// Closures are module functions too; a `Closure` expression refers to its
/// body by `FunctionId`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        FunctionId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({})", self.0)
    }
}

/// Identity of one syntactically written call, unique within a module.
///
/// Resolution results and emitter decisions are keyed by this id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CallSiteId(u32);

impl CallSiteId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        CallSiteId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CallSiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallSiteId({})", self.0)
    }
}
