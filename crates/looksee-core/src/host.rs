//! Read-only accessors over a host object model
//!
//! Everything the query engine knows about classes, modules and methods comes
//! through [`HostModel`]. Implementations must be side-effect free; the engine
//! calls them afresh on every query and never keeps the results.

use std::collections::BTreeMap;

use crate::error::InspectError;
use crate::model::{Handle, MethodDescriptor, MethodId, ModuleId, NodeKind, ObjectId};

/// Marker appended to the display name of an included-module link
pub const INCLUDED_MARKER: &str = "(included)";

pub trait HostModel {
    /// Whether `handle` still refers to a live entity.
    fn contains(&self, handle: Handle) -> bool;

    /// Runtime type name of a value, for diagnostics.
    fn type_name_of(&self, handle: Handle) -> String;

    fn node_kind(&self, node: ModuleId) -> NodeKind;

    /// The node's own name. Empty for anonymous classes and modules.
    fn module_name(&self, node: ModuleId) -> String;

    /// Raw superclass link; `None` terminates the ancestry.
    fn superclass_of(&self, node: ModuleId) -> Option<ModuleId>;

    /// The class method lookup starts from for `object`: its singleton class
    /// if it has one, its class otherwise.
    fn effective_class_of(&self, object: ObjectId) -> ModuleId;

    /// Locally defined method entries of `node`, never inherited ones.
    fn own_method_table_of(&self, node: ModuleId) -> BTreeMap<String, MethodId>;

    fn method_descriptor(&self, method: MethodId) -> Option<MethodDescriptor>;

    /// The value a singleton class is attached to, `None` for every other node.
    fn singleton_attachment(&self, node: ModuleId) -> Option<Handle>;

    /// The module an included-module link wraps, `None` for every other node.
    fn included_module_of(&self, node: ModuleId) -> Option<ModuleId>;

    fn is_included_link(&self, node: ModuleId) -> bool {
        self.node_kind(node) == NodeKind::IncludedModuleLink
    }

    fn is_singleton_class(&self, node: ModuleId) -> bool {
        self.node_kind(node) == NodeKind::SingletonClass
    }

    fn attached_object_of(&self, node: ModuleId) -> Result<Handle, InspectError> {
        if !self.is_singleton_class(node) {
            return Err(InspectError::type_kind(
                "singleton class",
                self.type_name_of(Handle::Module(node)),
            ));
        }
        self.singleton_attachment(node).ok_or_else(|| {
            InspectError::internal(format!("can't find the object {} is attached to", node))
        })
    }

    /// The module an included link stands for; any other node unchanged.
    fn canonical_class_of(&self, node: ModuleId) -> ModuleId {
        if self.is_included_link(node) {
            self.included_module_of(node).unwrap_or(node)
        } else {
            node
        }
    }

    fn display_name_of(&self, node: ModuleId) -> String {
        if self.is_included_link(node) {
            format!(
                "{} {}",
                self.module_name(self.canonical_class_of(node)),
                INCLUDED_MARKER
            )
        } else {
            self.module_name(node)
        }
    }
}
