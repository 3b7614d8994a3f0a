//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of errors reported twice at the same span
//! - `ErrorGuaranteed` proof that errors were emitted

use gala_ir::Span;
use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before stopping (0 = unlimited).
    pub error_limit: usize,
    /// Drop an error whose code and primary span match one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic);
/// // ... add more diagnostics
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes).
    error_count: usize,
    /// (code, primary span) of every queued error.
    seen: FxHashSet<(ErrorCode, Span)>,
    /// Set once the "too many errors" diagnostic has been queued.
    overflowed: bool,
    config: DiagnosticConfig,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            seen: FxHashSet::default(),
            overflowed: false,
            config,
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.limit_reached() {
            if !self.overflowed {
                self.overflowed = true;
                let span = diag.primary_span().unwrap_or(Span::DUMMY);
                self.diagnostics
                    .push(too_many_errors(self.config.error_limit, span));
            }
            return false;
        }

        let is_error = diag.is_error();
        if self.config.deduplicate && is_error {
            if let Some(span) = diag.primary_span() {
                if !self.seen.insert((diag.code, span)) {
                    return false;
                }
            }
        }

        self.diagnostics.push(diag);
        if is_error {
            self.error_count += 1;
        }
        true
    }

    /// Add every diagnostic from an iterator.
    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns `Some(ErrorGuaranteed)` if at least one error was emitted.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Sort diagnostics by position and return them.
    ///
    /// Clears the queue. Diagnostics without a primary span sort last; the
    /// sort is stable so reports at one position keep their insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| d.primary_span().map_or(u32::MAX, |s| s.start));

        let result = std::mem::take(&mut self.diagnostics);
        self.error_count = 0;
        self.seen.clear();
        self.overflowed = false;
        result
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message(format!("aborting due to {limit} previous errors"))
        .with_label(span, "error limit reached here")
        .with_note("raise `DiagnosticConfig::error_limit` to see more")
}
