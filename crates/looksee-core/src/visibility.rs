//! Partitioning of a module's own methods by visibility

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::error::InspectError;
use crate::host::HostModel;
use crate::model::{ModuleId, Visibility};

/// Where a method name lands in a [`VisibilityPartition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodState {
    Public,
    Protected,
    Private,
    Undefined,
}

impl MethodState {
    pub const ALL: [MethodState; 4] = [
        MethodState::Public,
        MethodState::Protected,
        MethodState::Private,
        MethodState::Undefined,
    ];
}

impl From<Visibility> for MethodState {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => MethodState::Public,
            Visibility::Protected => MethodState::Protected,
            Visibility::Private => MethodState::Private,
        }
    }
}

impl fmt::Display for MethodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MethodState::Public => "public",
            MethodState::Protected => "protected",
            MethodState::Private => "private",
            MethodState::Undefined => "undefined",
        };
        f.write_str(label)
    }
}

/// The own method names of one module, split into four disjoint sets whose
/// union is the module's method table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityPartition {
    pub public: BTreeSet<String>,
    pub protected: BTreeSet<String>,
    pub private: BTreeSet<String>,
    pub undefined: BTreeSet<String>,
}

impl VisibilityPartition {
    /// Scan `node`'s own method table once.
    ///
    /// An undefined entry goes to `undefined` whatever visibility it had.
    pub fn of<M: HostModel + ?Sized>(model: &M, node: ModuleId) -> Result<Self, InspectError> {
        let mut partition = Self::default();
        for (name, method) in model.own_method_table_of(node) {
            let descriptor = model.method_descriptor(method).ok_or_else(|| {
                error!(
                    "Method table of {} ({}) references missing {}",
                    node,
                    model.node_kind(node),
                    method
                );
                InspectError::internal(format!(
                    "method table of {} references missing {}",
                    node, method
                ))
            })?;
            let state = if descriptor.is_undefined {
                MethodState::Undefined
            } else {
                descriptor.visibility.into()
            };
            partition.set_mut(state).insert(name);
        }
        trace!("Partitioned {} methods of {}", partition.len(), node);
        Ok(partition)
    }

    pub fn get(&self, state: MethodState) -> &BTreeSet<String> {
        match state {
            MethodState::Public => &self.public,
            MethodState::Protected => &self.protected,
            MethodState::Private => &self.private,
            MethodState::Undefined => &self.undefined,
        }
    }

    fn set_mut(&mut self, state: MethodState) -> &mut BTreeSet<String> {
        match state {
            MethodState::Public => &mut self.public,
            MethodState::Protected => &mut self.protected,
            MethodState::Private => &mut self.private,
            MethodState::Undefined => &mut self.undefined,
        }
    }

    pub fn into_set(self, state: MethodState) -> BTreeSet<String> {
        match state {
            MethodState::Public => self.public,
            MethodState::Protected => self.protected,
            MethodState::Private => self.private,
            MethodState::Undefined => self.undefined,
        }
    }

    pub fn state_of(&self, name: &str) -> Option<MethodState> {
        MethodState::ALL
            .into_iter()
            .find(|state| self.get(*state).contains(name))
    }

    /// Every name with its state, sorted by name.
    pub fn entries(&self) -> Vec<(&str, MethodState)> {
        let mut entries: Vec<(&str, MethodState)> = MethodState::ALL
            .into_iter()
            .flat_map(|state| self.get(state).iter().map(move |name| (name.as_str(), state)))
            .collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.public.len() + self.protected.len() + self.private.len() + self.undefined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
