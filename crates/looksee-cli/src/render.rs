//! Plain-text rendering of lookup paths

use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;
use looksee_core::{HostModel, InspectError, Introspector, LookupPath, MethodState};
use regex::Regex;

use crate::columnizer::columnize;

/// Default listing width when neither `--width` nor `COLUMNS` is given
pub const DEFAULT_WIDTH: usize = 80;

/// Categories of method names a listing can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Shown {
    Public,
    Protected,
    Private,
    Undefined,
    /// Names hidden by a more specific entry
    Overridden,
}

impl Shown {
    pub fn all() -> BTreeSet<Shown> {
        Shown::value_variants().iter().copied().collect()
    }
}

impl From<MethodState> for Shown {
    fn from(state: MethodState) -> Self {
        match state {
            MethodState::Public => Shown::Public,
            MethodState::Protected => Shown::Protected,
            MethodState::Private => Shown::Private,
            MethodState::Undefined => Shown::Undefined,
        }
    }
}

/// Name filter: `/pattern/` is a regex, anything else a plain substring.
#[derive(Debug, Clone)]
pub enum NameFilter {
    Substring(String),
    Pattern(Regex),
}

impl NameFilter {
    pub fn parse(input: &str) -> Result<Self, regex::Error> {
        match input
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) if !pattern.is_empty() => Ok(Self::Pattern(Regex::new(pattern)?)),
            _ => Ok(Self::Substring(input.to_string())),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Substring(needle) => name.contains(needle.as_str()),
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring(needle) => f.write_str(needle),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Which names a lookup path listing includes.
#[derive(Debug, Clone)]
pub struct Selection {
    pub shown: BTreeSet<Shown>,
    pub filters: Vec<NameFilter>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            shown: Shown::all(),
            filters: Vec::new(),
        }
    }
}

impl Selection {
    pub fn new(shown: impl IntoIterator<Item = Shown>, filters: Vec<NameFilter>) -> Self {
        Self {
            shown: shown.into_iter().collect(),
            filters,
        }
    }

    /// A name is selected when its state is shown and it matches any filter
    /// (or there are no filters). Overridden names additionally need
    /// `overridden` to be shown.
    fn selects(&self, name: &str, state: MethodState, overridden: bool) -> bool {
        if !self.shown.contains(&Shown::from(state)) {
            return false;
        }
        if overridden && !self.shown.contains(&Shown::Overridden) {
            return false;
        }
        self.filters.is_empty() || self.filters.iter().any(|filter| filter.matches(name))
    }
}

/// Render `path` least specific entry first, one header per module followed
/// by its selected method names in columns.
pub fn render_lookup_path<M: HostModel + ?Sized>(
    introspector: &Introspector<'_, M>,
    path: &LookupPath,
    selection: &Selection,
    width: usize,
) -> Result<String, InspectError> {
    let mut blocks = Vec::with_capacity(path.entries().len());
    for entry in path.entries().iter().rev() {
        let mut block = introspector.describe_module(entry.link().module)?;
        block.push('\n');
        let names: Vec<String> = entry
            .methods()
            .filter(|(name, state)| selection.selects(name, *state, entry.is_overridden(name)))
            .map(|(name, _)| name.to_string())
            .collect();
        block.push_str(&columnize(&names, width));
        blocks.push(block.trim_end().to_string());
    }
    Ok(blocks.join("\n"))
}
