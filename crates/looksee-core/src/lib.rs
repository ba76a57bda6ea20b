//! Method lookup path and method origin introspection
//!
//! The crate answers two questions about a live class-and-module object model:
//! the ordered ancestry of a class, module or object, and where a method was
//! defined. The object model itself is reached through the [`HostModel`]
//! trait; [`ObjectSpace`] is an in-memory implementation of it.

pub mod ancestry;
pub mod config;
pub mod describe;
pub mod error;
pub mod host;
pub mod introspector;
pub mod lookup_path;
pub mod model;
pub mod object_space;
pub mod origin;
pub mod snapshot;
pub mod visibility;

pub use ancestry::{AncestryChain, AncestryWalker, ChainLink};
pub use config::{IntrospectorConfig, SingletonInstanceMode};
pub use error::{InspectError, LoadError};
pub use host::HostModel;
pub use introspector::Introspector;
pub use lookup_path::{LookupPath, LookupPathEntry};
pub use model::{
    Handle, MethodDescriptor, MethodId, ModuleId, NodeKind, ObjectId, Representation,
    SourceLocation, Visibility,
};
pub use object_space::ObjectSpace;
pub use origin::{Origin, OriginResolver};
pub use snapshot::{LoadedModel, ModelSnapshot};
pub use visibility::{MethodState, VisibilityPartition};
