//! Diagnostic system for compile-time error reporting.
//!
//! Every construction, verification and resolution problem is reported as a
//! `Diagnostic`:
//! - Error code for searchability
//! - Clear message (what went wrong)
//! - Primary span (where it went wrong)
//! - Notes (why it's wrong)
//!
//! Passes push diagnostics into a `DiagnosticQueue`, which batches them so
//! that one bad call site never hides the next one.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
