//! Compilation session.
//!
//! One session is one compilation: it owns the interner and the function
//! and extension registries, and drives the passes over sibling units.
//! Units fail independently; a construction or resolution error in one
//! unit never stops the others.

use gala_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use gala_ir::{Module, Name, SharedInterner};

use crate::registry::{Registries, SharedMutableRegistry};
use crate::{resolve_module, verify_locals, LocalTable, ModuleBuilder, Resolutions};

/// Session-wide settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionConfig {
    /// Applied to each unit's diagnostic queue.
    pub diagnostics: DiagnosticConfig,
}

/// A unit that passed every check, ready for the emitter.
#[derive(Debug)]
pub struct CompiledUnit {
    pub module: Module,
    pub locals: LocalTable,
    pub resolutions: Resolutions,
}

/// A unit that failed, with its errors sorted by position.
#[derive(Debug)]
pub struct FailedUnit {
    pub name: Name,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CompilationSession {
    interner: SharedInterner,
    registries: SharedMutableRegistry<Registries>,
    config: SessionConfig,
}

impl CompilationSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_interner(SharedInterner::new(), config)
    }

    /// Share an interner with the front end that built the units.
    pub fn with_interner(interner: SharedInterner, config: SessionConfig) -> Self {
        CompilationSession {
            interner,
            registries: SharedMutableRegistry::new(Registries::default()),
            config,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn registries(&self) -> SharedMutableRegistry<Registries> {
        self.registries.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Compile sibling units.
    ///
    /// Every unit is published and registered before any is resolved, so
    /// cross-unit calls do not depend on the order of `units`. A unit that
    /// fails construction is not registered. Results keep input order.
    #[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn compile_units(
        &self,
        units: Vec<ModuleBuilder>,
    ) -> Vec<Result<CompiledUnit, FailedUnit>> {
        let published: Vec<Result<Module, FailedUnit>> = units
            .into_iter()
            .map(|unit| {
                let name = unit.name();
                unit.finish(&self.interner)
                    .map_err(|errors| self.fail(name, errors))
            })
            .collect();

        {
            let mut registries = self.registries.write();
            for module in published.iter().flatten() {
                registries.register_module(module);
            }
        }

        let registries = self.registries.read();
        published
            .into_iter()
            .map(|unit| unit.and_then(|module| self.check(module, &registries)))
            .collect()
    }

    /// Local verification and resolution of one published unit.
    fn check(&self, module: Module, registries: &Registries) -> Result<CompiledUnit, FailedUnit> {
        let mut queue = DiagnosticQueue::with_config(self.config.diagnostics.clone());
        let locals = verify_locals(&module, &self.interner, &mut queue);
        let resolutions = resolve_module(
            &module,
            &registries.functions,
            &registries.extensions,
            &locals,
            &self.interner,
            &mut queue,
        );

        if queue.has_errors().is_some() {
            tracing::debug!(
                unit = self.interner.lookup(module.name()),
                errors = queue.error_count(),
                "unit failed resolution"
            );
            return Err(FailedUnit {
                name: module.name(),
                diagnostics: queue.flush(),
            });
        }
        Ok(CompiledUnit {
            module,
            locals,
            resolutions,
        })
    }

    fn fail(&self, name: Name, errors: Vec<Diagnostic>) -> FailedUnit {
        tracing::debug!(
            unit = self.interner.lookup(name),
            errors = errors.len(),
            "unit failed construction"
        );
        let mut queue = DiagnosticQueue::with_config(self.config.diagnostics.clone());
        queue.extend(errors);
        FailedUnit {
            name,
            diagnostics: queue.flush(),
        }
    }
}

#[cfg(test)]
mod tests;
