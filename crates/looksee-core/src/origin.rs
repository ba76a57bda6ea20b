//! Method origin resolution
//!
//! A method handle may sit several layers away from the code that defined it:
//! an alias of a visibility wrapper of a bound closure, say. [`OriginResolver`]
//! peels those layers one at a time until it reaches a source position or a
//! representation with no source at all.

use serde::Serialize;
use tracing::{error, trace};

use crate::error::InspectError;
use crate::host::HostModel;
use crate::model::{MethodId, Representation, SourceLocation};

/// Largest number of indirection layers followed before giving up
pub const DEFAULT_MAX_INDIRECTION_DEPTH: usize = 16;

/// Outcome of origin resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Origin {
    Resolved(SourceLocation),
    /// No source location is knowable, e.g. for natively implemented methods
    Unresolved,
}

impl Origin {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Origin::Resolved(location) => Some(location),
            Origin::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Origin::Resolved(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OriginResolver {
    max_depth: usize,
}

impl Default for OriginResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INDIRECTION_DEPTH)
    }
}

impl OriginResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Resolve where `method` was originally defined.
    ///
    /// Every layer is fetched from `model` at call time, so the result
    /// reflects the live model and repeated calls agree while it is unchanged.
    pub fn resolve<M: HostModel + ?Sized>(
        &self,
        model: &M,
        method: MethodId,
    ) -> Result<Origin, InspectError> {
        let mut current = method;
        let mut depth = 0;
        loop {
            let descriptor = model.method_descriptor(current).ok_or_else(|| {
                error!("Method {} reached from {} no longer exists", current, method);
                InspectError::internal(format!("stale method handle {}", current))
            })?;
            let kind = descriptor.representation.kind_name();
            let next = match descriptor.representation {
                Representation::Direct { file, line }
                | Representation::ClosureBacked { file, line } => {
                    let location = SourceLocation::from_host(file, line);
                    trace!("Resolved {} to {} at depth {}", method, location, depth);
                    return Ok(Origin::Resolved(location));
                }
                Representation::Opaque => {
                    trace!("{} has no source location", method);
                    return Ok(Origin::Unresolved);
                }
                Representation::Alias { target } => target,
                Representation::Wrapper { inner } => inner,
                Representation::BoundFromUnbound { unbound } => unbound,
            };
            if depth == self.max_depth {
                error!(
                    "Unexpected indirection depth resolving {} (stopped at {} {} `{}')",
                    method, kind, current, descriptor.name
                );
                return Err(InspectError::internal(format!(
                    "unexpected indirection depth resolving {}: more than {} layers",
                    method, self.max_depth
                )));
            }
            depth += 1;
            current = next;
        }
    }
}
