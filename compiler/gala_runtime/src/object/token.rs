use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

/// Validity flag shared between an object and the stubs it issued.
///
/// Starts valid; once invalidated it never becomes valid again.
#[derive(Clone, Debug)]
pub struct InvalidationToken(Arc<AtomicBool>);

impl InvalidationToken {
    pub(crate) fn new() -> Self {
        InvalidationToken(Arc::new(AtomicBool::new(true)))
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn invalidate(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Only the issuing set still holds it.
    fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.0) == 1
    }
}

/// Live tokens issued for one property name.
#[derive(Default, Debug)]
pub(crate) struct TokenSet {
    live: SmallVec<[InvalidationToken; 2]>,
}

impl TokenSet {
    /// Issue a fresh valid token. Tokens whose stubs are gone are pruned.
    pub(crate) fn issue(&mut self) -> InvalidationToken {
        self.live.retain(|token| !token.is_orphaned());
        let token = InvalidationToken::new();
        self.live.push(token.clone());
        token
    }

    /// Invalidate and forget every live token; returns how many there were.
    pub(crate) fn invalidate_all(&mut self) -> usize {
        let count = self.live.len();
        for token in self.live.drain(..) {
            token.invalidate();
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }
}
