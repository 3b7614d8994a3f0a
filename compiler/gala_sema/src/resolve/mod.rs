//! Invocation resolution.
//!
//! Decides, for every call site of a published module, how the emitter
//! should call it:
//!
//! - `name(args)` with `on_reference` set goes through the local binding
//!   (reference dispatch). Without one it is an E2001 error.
//! - Otherwise a MODULE function of matching arity wins (direct link),
//!   then a local binding of that name (reference dispatch). Neither is
//!   an E2001 error at the call site.
//! - `receiver.name(args)` links directly to an EXTENSION function when
//!   the receiver type is known and one matches; otherwise the call is
//!   dynamic and linked at run time against the receiver object.
//!
//! Errors are batched: every call site is visited even after a failure.

use rustc_hash::FxHashMap;

use gala_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use gala_ir::visitor::{walk_function_invocation, walk_method_invocation, Visitor};
use gala_ir::{
    CallSiteId, FunctionId, FunctionInvocation, FunctionScope, MethodInvocation, Module, Name,
    Spanned, StringInterner,
};

use crate::registry::{ExtensionRegistry, FunctionEntry, FunctionRegistry};
use crate::LocalTable;

/// The function a direct link calls.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionTarget {
    /// Defining unit.
    pub module: Name,
    pub function: FunctionId,
    pub scope: FunctionScope,
    /// Trailing arguments are packed into the last parameter.
    pub varargs: bool,
}

impl From<FunctionEntry> for FunctionTarget {
    fn from(entry: FunctionEntry) -> Self {
        FunctionTarget {
            module: entry.module,
            function: entry.function,
            scope: entry.scope,
            varargs: entry.varargs,
        }
    }
}

/// How one call site is emitted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    /// Specialized call to a known function.
    Direct(FunctionTarget),
    /// Invoke whatever callable the named local binding holds.
    Reference(Name),
    /// Method call on a dynamic object, linked at run time.
    Dynamic,
}

/// Resolution outcome per call site. Sites that failed to resolve are
/// absent; their errors are in the diagnostic queue.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Resolutions {
    sites: FxHashMap<CallSiteId, Resolution>,
}

impl Resolutions {
    pub fn get(&self, site: CallSiteId) -> Option<Resolution> {
        self.sites.get(&site).copied()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Resolved sites in call-site order.
    pub fn iter(&self) -> impl Iterator<Item = (CallSiteId, Resolution)> + '_ {
        let mut sites: Vec<_> = self.sites.iter().map(|(&s, &r)| (s, r)).collect();
        sites.sort_unstable_by_key(|(site, _)| *site);
        sites.into_iter()
    }
}

/// Resolve every call site of `module`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(module = interner.lookup(module.name()), sites = module.call_site_count())
)]
pub fn resolve_module(
    module: &Module,
    functions: &FunctionRegistry,
    extensions: &ExtensionRegistry,
    locals: &LocalTable,
    interner: &StringInterner,
    queue: &mut DiagnosticQueue,
) -> Resolutions {
    let mut resolver = Resolver {
        module,
        functions,
        extensions,
        locals,
        interner,
        queue,
        resolutions: Resolutions::default(),
    };
    resolver.visit_module(module);
    tracing::debug!(resolved = resolver.resolutions.len(), "resolution done");
    resolver.resolutions
}

struct Resolver<'a> {
    module: &'a Module,
    functions: &'a FunctionRegistry,
    extensions: &'a ExtensionRegistry,
    locals: &'a LocalTable,
    interner: &'a StringInterner,
    queue: &'a mut DiagnosticQueue,
    resolutions: Resolutions,
}

impl Resolver<'_> {
    fn resolve_function_call(&self, invocation: &FunctionInvocation) -> Option<Resolution> {
        let name = invocation.name();
        let bound = self.locals.binding_at(invocation.call.site);
        if invocation.on_reference {
            return bound.map(|_| Resolution::Reference(name));
        }
        if let Some(entry) = self.functions.lookup(
            self.module.name(),
            self.module.imports(),
            name,
            invocation.call.arity(),
        ) {
            return Some(Resolution::Direct(entry.into()));
        }
        bound.map(|_| Resolution::Reference(name))
    }

    fn record(&mut self, site: CallSiteId, resolution: Resolution) {
        tracing::trace!(site = site.index(), ?resolution, "resolved call site");
        self.resolutions.sites.insert(site, resolution);
    }
}

impl<'ir> Visitor<'ir> for Resolver<'_> {
    fn visit_function_invocation(&mut self, invocation: &'ir FunctionInvocation) {
        match self.resolve_function_call(invocation) {
            Some(resolution) => self.record(invocation.call.site, resolution),
            None => {
                let name = self.interner.lookup(invocation.name());
                let arity = invocation.call.arity();
                self.queue.add(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message(format!("cannot resolve call to `{name}`"))
                        .with_label(invocation.span(), "not found in this scope")
                        .with_note(format!(
                            "no function `{name}` taking {arity} argument(s) is visible here, \
                             and no local binding is named `{name}`"
                        )),
                );
            }
        }
        walk_function_invocation(self, invocation);
    }

    fn visit_method_invocation(&mut self, invocation: &'ir MethodInvocation) {
        let extension = invocation.receiver_type.and_then(|receiver_type| {
            self.extensions.lookup(
                self.module.name(),
                receiver_type,
                invocation.name(),
                invocation.call.arity(),
            )
        });
        let resolution = match extension {
            Some(entry) => Resolution::Direct(entry.into()),
            None => Resolution::Dynamic,
        };
        self.record(invocation.call.site, resolution);
        walk_method_invocation(self, invocation);
    }
}

#[cfg(test)]
mod tests;
