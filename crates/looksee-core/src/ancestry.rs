//! Ancestry walking
//!
//! The ancestry of a node is the chain produced by following superclass links
//! until the host model reports none. Earlier entries take precedence during
//! method resolution.

use serde::Serialize;
use tracing::{debug, error};

use crate::error::InspectError;
use crate::host::HostModel;
use crate::model::{ModuleId, NodeKind};

/// Upper bound on superclass hops before a walk is declared runaway
pub const DEFAULT_MAX_ANCESTRY_STEPS: usize = 100_000;

/// One node of an ancestry chain, with the kind it had when walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChainLink {
    pub module: ModuleId,
    pub kind: NodeKind,
}

impl ChainLink {
    pub fn is_singleton_class(&self) -> bool {
        self.kind == NodeKind::SingletonClass
    }

    pub fn is_included_link(&self) -> bool {
        self.kind == NodeKind::IncludedModuleLink
    }
}

/// Method-resolution order, most specific first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestryChain {
    links: Vec<ChainLink>,
}

impl AncestryChain {
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// A walk always yields at least the start node.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn most_specific(&self) -> ChainLink {
        self.links[0]
    }

    pub fn least_specific(&self) -> ChainLink {
        self.links[self.links.len() - 1]
    }

    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.links.iter().map(|link| link.module)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChainLink> {
        self.links.iter()
    }

    pub fn contains(&self, module: ModuleId) -> bool {
        self.links.iter().any(|link| link.module == module)
    }

    pub fn position(&self, module: ModuleId) -> Option<usize> {
        self.links.iter().position(|link| link.module == module)
    }
}

impl<'a> IntoIterator for &'a AncestryChain {
    type Item = &'a ChainLink;
    type IntoIter = std::slice::Iter<'a, ChainLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AncestryWalker {
    max_steps: usize,
}

impl Default for AncestryWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ANCESTRY_STEPS)
    }
}

impl AncestryWalker {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    /// Follow superclass links from `start` until none remain.
    ///
    /// The host model guarantees an acyclic superclass relation, so there is
    /// no cycle detection; exceeding `max_steps` hops is reported as an
    /// internal error instead.
    pub fn walk<M: HostModel + ?Sized>(
        &self,
        model: &M,
        start: ModuleId,
    ) -> Result<AncestryChain, InspectError> {
        let mut links = vec![ChainLink {
            module: start,
            kind: model.node_kind(start),
        }];
        let mut current = start;
        while let Some(next) = model.superclass_of(current) {
            if links.len() > self.max_steps {
                error!(
                    "Ancestry walk from {} ({}) exceeded {} steps",
                    start,
                    model.node_kind(start),
                    self.max_steps
                );
                return Err(InspectError::internal(format!(
                    "ancestry of {} exceeded {} steps",
                    start, self.max_steps
                )));
            }
            links.push(ChainLink {
                module: next,
                kind: model.node_kind(next),
            });
            current = next;
        }
        debug!("Walked {} ancestors from {}", links.len(), start);
        Ok(AncestryChain { links })
    }
}
