//! Query facade
//!
//! [`Introspector`] is the entry point for callers. It checks that each
//! argument is the right kind of handle, then delegates to the walker,
//! partitioner and resolver. It keeps no state between calls beyond its
//! configuration: every query reads the host model afresh.

use std::collections::BTreeSet;

use tracing::{debug, error};

use crate::ancestry::{AncestryChain, AncestryWalker};
use crate::config::{IntrospectorConfig, SingletonInstanceMode};
use crate::describe;
use crate::error::InspectError;
use crate::host::HostModel;
use crate::lookup_path::LookupPath;
use crate::model::{Handle, MethodId, ModuleId};
use crate::origin::{Origin, OriginResolver};
use crate::visibility::{MethodState, VisibilityPartition};

pub struct Introspector<'m, M: HostModel + ?Sized> {
    model: &'m M,
    config: IntrospectorConfig,
}

impl<'m, M: HostModel + ?Sized> Introspector<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self::with_config(model, IntrospectorConfig::default())
    }

    pub fn with_config(model: &'m M, config: IntrospectorConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &IntrospectorConfig {
        &self.config
    }

    pub fn model(&self) -> &'m M {
        self.model
    }

    fn ensure_live(&self, handle: Handle) -> Result<(), InspectError> {
        if self.model.contains(handle) {
            Ok(())
        } else {
            error!("Stale handle {} passed to introspector", handle);
            Err(InspectError::internal(format!("stale handle {}", handle)))
        }
    }

    fn expect_module(&self, handle: Handle) -> Result<ModuleId, InspectError> {
        self.ensure_live(handle)?;
        match handle {
            Handle::Module(module) => Ok(module),
            other => Err(InspectError::type_kind(
                "module",
                self.model.type_name_of(other),
            )),
        }
    }

    fn expect_method(&self, handle: Handle) -> Result<MethodId, InspectError> {
        self.ensure_live(handle)?;
        match handle {
            Handle::Method(method) => Ok(method),
            other => Err(InspectError::type_kind(
                "method",
                self.model.type_name_of(other),
            )),
        }
    }

    /// The node method lookup starts from for `handle`.
    fn lookup_start(&self, handle: Handle) -> Result<ModuleId, InspectError> {
        self.ensure_live(handle)?;
        match handle {
            Handle::Module(module) => Ok(module),
            Handle::Object(object) => Ok(self.model.effective_class_of(object)),
            Handle::Method(_) => Err(InspectError::type_kind(
                "module or object",
                self.model.type_name_of(handle),
            )),
        }
    }

    /// Ancestry of a class or module, or of an object's effective class.
    pub fn ancestry_of(&self, handle: impl Into<Handle>) -> Result<AncestryChain, InspectError> {
        let handle = handle.into();
        let start = self.lookup_start(handle)?;
        debug!("Ancestry query for {} starting at {}", handle, start);
        AncestryWalker::new(self.config.max_ancestry_steps).walk(self.model, start)
    }

    pub fn visibility_partition(
        &self,
        handle: impl Into<Handle>,
    ) -> Result<VisibilityPartition, InspectError> {
        let module = self.expect_module(handle.into())?;
        VisibilityPartition::of(self.model, module)
    }

    fn methods_in(
        &self,
        handle: impl Into<Handle>,
        state: MethodState,
    ) -> Result<BTreeSet<String>, InspectError> {
        Ok(self.visibility_partition(handle)?.into_set(state))
    }

    pub fn public_methods(&self, handle: impl Into<Handle>) -> Result<BTreeSet<String>, InspectError> {
        self.methods_in(handle, MethodState::Public)
    }

    pub fn protected_methods(
        &self,
        handle: impl Into<Handle>,
    ) -> Result<BTreeSet<String>, InspectError> {
        self.methods_in(handle, MethodState::Protected)
    }

    pub fn private_methods(&self, handle: impl Into<Handle>) -> Result<BTreeSet<String>, InspectError> {
        self.methods_in(handle, MethodState::Private)
    }

    pub fn undefined_methods(
        &self,
        handle: impl Into<Handle>,
    ) -> Result<BTreeSet<String>, InspectError> {
        self.methods_in(handle, MethodState::Undefined)
    }

    pub fn is_included_link(&self, handle: impl Into<Handle>) -> Result<bool, InspectError> {
        let module = self.expect_module(handle.into())?;
        Ok(self.model.is_included_link(module))
    }

    pub fn is_singleton_class(&self, handle: impl Into<Handle>) -> Result<bool, InspectError> {
        let module = self.expect_module(handle.into())?;
        Ok(self.model.is_singleton_class(module))
    }

    /// The value a singleton class is attached to.
    ///
    /// For anything else the outcome depends on the configured
    /// [`SingletonInstanceMode`]: a type error when strict, `None` when
    /// lenient.
    pub fn singleton_instance(
        &self,
        handle: impl Into<Handle>,
    ) -> Result<Option<Handle>, InspectError> {
        let handle = handle.into();
        self.ensure_live(handle)?;
        if let Handle::Module(module) = handle {
            if self.model.is_singleton_class(module) {
                return self.model.attached_object_of(module).map(Some);
            }
        }
        match self.config.singleton_mode {
            SingletonInstanceMode::Strict => Err(InspectError::type_kind(
                "singleton class",
                self.model.type_name_of(handle),
            )),
            SingletonInstanceMode::Lenient => Ok(None),
        }
    }

    pub fn canonical_class(&self, handle: impl Into<Handle>) -> Result<ModuleId, InspectError> {
        let module = self.expect_module(handle.into())?;
        Ok(self.model.canonical_class_of(module))
    }

    pub fn display_name(&self, handle: impl Into<Handle>) -> Result<String, InspectError> {
        let module = self.expect_module(handle.into())?;
        Ok(self.model.display_name_of(module))
    }

    /// Label for a module as shown in lookup path listings.
    pub fn describe_module(&self, handle: impl Into<Handle>) -> Result<String, InspectError> {
        let module = self.expect_module(handle.into())?;
        describe::describe_module(self.model, module, self.config.max_ancestry_steps)
    }

    /// Label for a module as [`describe_module`](Self::describe_module)
    /// gives it, or `<Class> instance` for a plain object.
    pub fn describe(&self, handle: impl Into<Handle>) -> Result<String, InspectError> {
        let handle = handle.into();
        self.ensure_live(handle)?;
        match handle {
            Handle::Module(module) => self.describe_module(module),
            Handle::Object(_) => Ok(format!("{} instance", self.model.type_name_of(handle))),
            Handle::Method(_) => Err(InspectError::type_kind(
                "module or object",
                self.model.type_name_of(handle),
            )),
        }
    }

    pub fn origin_of(&self, handle: impl Into<Handle>) -> Result<Origin, InspectError> {
        let method = self.expect_method(handle.into())?;
        OriginResolver::new(self.config.max_indirection_depth).resolve(self.model, method)
    }

    /// Ancestry of `handle` together with the methods of each node.
    pub fn lookup_path(&self, handle: impl Into<Handle>) -> Result<LookupPath, InspectError> {
        let handle = handle.into();
        let chain = self.ancestry_of(handle)?;
        LookupPath::build(self.model, handle, &chain)
    }
}
