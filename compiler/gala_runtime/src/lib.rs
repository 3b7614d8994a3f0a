//! Gala dynamic-object runtime.
//!
//! Prototype-style objects whose properties can be redefined while code
//! runs, and the guarded dispatch protocol generated call sites use to
//! call them:
//!
//! 1. a call site asks the receiver to `link` a stub for `(name, shape)`;
//! 2. the stub calls its target directly while its invalidation token is
//!    live and the receiver is the object that issued it;
//! 3. otherwise it calls the site's fallback, which re-links.
//!
//! Redefining a property invalidates exactly the tokens issued for that
//! name, so a stale target is never called after `define` returns.
//!
//! # Tracing
//!
//! Linking and invalidation emit `tracing` events. Call `init_tracing()`
//! and run with `RUST_LOG=gala_runtime=trace` to see them.

mod call_site;
mod errors;
mod object;
mod stub;
mod value;

pub use call_site::{MethodCallSite, ReferenceCallSite};
pub use errors::{LinkError, RuntimeError};
pub use object::{DynamicObject, InvalidationToken, ObjectId};
pub use stub::{CallShape, DispatchStub, Fallback, Target};
pub use value::{Args, BoundMethod, Callable, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=gala_runtime=debug` or `RUST_LOG=gala_runtime=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
