//! Handles and value types shared by the host model and the query engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a class, module, singleton class or included-module link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

/// Handle to a plain (non-module) object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Handle to a method entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(pub u32);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

/// Any runtime value the facade can be handed.
///
/// Queries take a `Handle` rather than a typed id wherever the caller may
/// pass the wrong kind of value; the facade rejects those with a
/// [`crate::InspectError::TypeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Module(ModuleId),
    Object(ObjectId),
    Method(MethodId),
}

impl Handle {
    pub fn as_module(self) -> Option<ModuleId> {
        match self {
            Handle::Module(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_object(self) -> Option<ObjectId> {
        match self {
            Handle::Object(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            Handle::Method(id) => Some(id),
            _ => None,
        }
    }
}

impl From<ModuleId> for Handle {
    fn from(id: ModuleId) -> Self {
        Handle::Module(id)
    }
}

impl From<ObjectId> for Handle {
    fn from(id: ObjectId) -> Self {
        Handle::Object(id)
    }
}

impl From<MethodId> for Handle {
    fn from(id: MethodId) -> Self {
        Handle::Method(id)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Module(id) => id.fmt(f),
            Handle::Object(id) => id.fmt(f),
            Handle::Method(id) => id.fmt(f),
        }
    }
}

/// Runtime-assigned kind of a module node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Module,
    /// Synthetic class attached to exactly one object
    SingletonClass,
    /// Synthetic ancestry node standing in for a mixed-in module
    IncludedModuleLink,
}

impl NodeKind {
    pub fn is_synthetic(self) -> bool {
        matches!(self, NodeKind::SingletonClass | NodeKind::IncludedModuleLink)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Class => "class",
            NodeKind::Module => "module",
            NodeKind::SingletonClass => "singleton class",
            NodeKind::IncludedModuleLink => "included module",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        };
        f.write_str(label)
    }
}

/// How a method entry is backed.
///
/// Line numbers carried here are the host model's 0-based values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    /// Defined directly in source
    Direct { file: String, line: u32 },
    /// Another name for `target`
    Alias { target: MethodId },
    /// A closure promoted to a method; the position is the closure's capture site
    ClosureBacked { file: String, line: u32 },
    /// A copy of `inner` with rewritten visibility
    Wrapper { inner: MethodId },
    /// A bound method built from an unbound one
    BoundFromUnbound { unbound: MethodId },
    /// Natively implemented, or a tombstone: no source position is knowable
    Opaque,
}

impl Representation {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Representation::Direct { .. } => "direct",
            Representation::Alias { .. } => "alias",
            Representation::ClosureBacked { .. } => "closure",
            Representation::Wrapper { .. } => "wrapper",
            Representation::BoundFromUnbound { .. } => "bound",
            Representation::Opaque => "opaque",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub owner: ModuleId,
    pub visibility: Visibility,
    /// Explicitly removed from resolution while still occupying its slot
    pub is_undefined: bool,
    pub representation: Representation,
}

/// A source position with a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Convert a host position (0-based line) to a reported one.
    pub fn from_host(file: impl Into<String>, host_line: u32) -> Self {
        Self::new(file, host_line.saturating_add(1))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
