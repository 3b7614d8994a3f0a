//! Proof that at least one error was reported.

use std::fmt;

/// Zero-sized proof that an error diagnostic was emitted.
///
/// Only the diagnostic queue hands these out, so a pass returning
/// `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an externally tracked error count.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
