//! The method lookup path of a value: its ancestry with each node's methods

use std::collections::{BTreeMap, BTreeSet};

use crate::ancestry::{AncestryChain, ChainLink};
use crate::error::InspectError;
use crate::host::HostModel;
use crate::model::{Handle, MethodId, ModuleId};
use crate::visibility::{MethodState, VisibilityPartition};

/// One ancestry node and the methods it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPathEntry {
    link: ChainLink,
    module: ModuleId,
    methods: BTreeMap<String, MethodState>,
    handles: BTreeMap<String, MethodId>,
    overridden: BTreeSet<String>,
}

impl LookupPathEntry {
    pub fn link(&self) -> ChainLink {
        self.link
    }

    /// The canonical module, i.e. the wrapped module for included links.
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Method names with their state, in name order.
    pub fn methods(&self) -> impl Iterator<Item = (&str, MethodState)> + '_ {
        self.methods
            .iter()
            .map(|(name, state)| (name.as_str(), *state))
    }

    pub fn state_of(&self, name: &str) -> Option<MethodState> {
        self.methods.get(name).copied()
    }

    pub fn method(&self, name: &str) -> Option<MethodId> {
        self.handles.get(name).copied()
    }

    /// Whether a more specific entry already defines `name`.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overridden.contains(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPath {
    subject: Handle,
    entries: Vec<LookupPathEntry>,
}

impl LookupPath {
    /// Collect the methods of every node in `chain`.
    pub fn build<M: HostModel + ?Sized>(
        model: &M,
        subject: Handle,
        chain: &AncestryChain,
    ) -> Result<Self, InspectError> {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(chain.len());
        for link in chain {
            let partition = VisibilityPartition::of(model, link.module)?;
            let methods: BTreeMap<String, MethodState> = partition
                .entries()
                .into_iter()
                .map(|(name, state)| (name.to_string(), state))
                .collect();
            let mut handles = model.own_method_table_of(link.module);
            handles.retain(|name, _| methods.contains_key(name));
            let entry = LookupPathEntry {
                link: *link,
                module: model.canonical_class_of(link.module),
                overridden: seen.clone(),
                methods,
                handles,
            };
            seen.extend(entry.methods.keys().cloned());
            entries.push(entry);
        }
        Ok(Self { subject, entries })
    }

    pub fn subject(&self) -> Handle {
        self.subject
    }

    /// Entries in precedence order, most specific first.
    pub fn entries(&self) -> &[LookupPathEntry] {
        &self.entries
    }

    /// The method a call to `name` would reach, if any.
    ///
    /// The first entry that mentions `name` decides: an undefined tombstone
    /// there hides every later definition.
    pub fn find(&self, name: &str) -> Option<MethodId> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.state_of(name).is_some())?;
        match entry.state_of(name) {
            Some(MethodState::Undefined) | None => None,
            Some(_) => entry.method(name),
        }
    }
}
