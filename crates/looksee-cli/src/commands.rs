//! Subcommands and their text output

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use tracing::debug;

use looksee_core::{Handle, Introspector, LoadedModel, MethodState, ObjectSpace, Origin};

use crate::render::{render_lookup_path, NameFilter, Selection, Shown};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the ancestry chain, most specific first
    Ancestry {
        /// Constant name, @name for a named object, [target] for its singleton
        target: String,
    },

    /// List the methods a module defines itself
    Methods {
        /// Constant name of the module
        module: String,

        /// Only list methods in this state
        #[arg(long)]
        visibility: Option<StateArg>,
    },

    /// Print where a method was originally defined
    Origin {
        /// Constant name, @name for a named object, [target] for its singleton
        target: String,

        /// Method name, resolved along the lookup path of the target
        method: String,
    },

    /// Print the label a module or object is listed under
    Describe {
        /// Constant name, @name for a named object, [target] for its singleton
        target: String,
    },

    /// Print the full method lookup path
    Inspect {
        /// Constant name, @name for a named object, [target] for its singleton
        target: String,

        /// Categories of names to show (defaults to all of them)
        #[arg(long, value_delimiter = ',')]
        show: Vec<Shown>,

        /// Only show names containing this text, or matching /regex/
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Listing width
        #[arg(long, env = "COLUMNS", default_value_t = crate::render::DEFAULT_WIDTH)]
        width: usize,
    },

    /// Print the value a singleton class is attached to
    Singleton {
        /// A singleton class, written `[Name]` or `[@name]`
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Public,
    Protected,
    Private,
    Undefined,
}

impl From<StateArg> for MethodState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Public => MethodState::Public,
            StateArg::Protected => MethodState::Protected,
            StateArg::Private => MethodState::Private,
            StateArg::Undefined => MethodState::Undefined,
        }
    }
}

impl Command {
    /// The target argument every subcommand takes.
    pub fn target(&self) -> &str {
        match self {
            Command::Ancestry { target }
            | Command::Origin { target, .. }
            | Command::Describe { target }
            | Command::Inspect { target, .. }
            | Command::Singleton { target } => target,
            Command::Methods { module, .. } => module,
        }
    }
}

/// Run `command` against `handle`, its resolved target, returning what
/// should be printed.
pub fn execute(
    command: &Command,
    handle: Handle,
    loaded: &LoadedModel,
    introspector: &Introspector<'_, ObjectSpace>,
) -> Result<String> {
    match command {
        Command::Ancestry { target } => {
            let chain = introspector
                .ancestry_of(handle)
                .with_context(|| format!("Failed to walk the ancestry of {}", target))?;
            debug!("Ancestry of {} has {} links", target, chain.len());
            let mut lines = Vec::with_capacity(chain.len());
            for link in &chain {
                let label = if link.is_singleton_class() {
                    introspector.describe_module(link.module)?
                } else {
                    introspector.display_name(link.module)?
                };
                lines.push(label);
            }
            Ok(lines.join("\n"))
        }

        Command::Methods { module, visibility } => {
            let partition = introspector
                .visibility_partition(handle)
                .with_context(|| format!("Failed to list the methods of {}", module))?;
            let states: Vec<MethodState> = match visibility {
                Some(state) => vec![MethodState::from(*state)],
                None => MethodState::ALL.to_vec(),
            };
            let lines: Vec<String> = states
                .into_iter()
                .filter(|state| visibility.is_some() || !partition.get(*state).is_empty())
                .map(|state| {
                    let names: Vec<&str> =
                        partition.get(state).iter().map(String::as_str).collect();
                    if visibility.is_some() {
                        names.join("\n")
                    } else {
                        format!("{}: {}", state, names.join(" "))
                    }
                })
                .collect();
            Ok(lines.join("\n"))
        }

        Command::Origin { target, method } => {
            let path = introspector.lookup_path(handle)?;
            let Some(found) = path.find(method) else {
                bail!("Undefined method `{}' for `{}'", method, target);
            };
            match introspector.origin_of(found)? {
                Origin::Resolved(location) => Ok(location.to_string()),
                Origin::Unresolved => Ok("(no source location)".to_string()),
            }
        }

        Command::Describe { .. } => Ok(introspector.describe(handle)?),

        Command::Inspect {
            show,
            filters,
            width,
            ..
        } => {
            let filters = filters
                .iter()
                .map(|filter| {
                    NameFilter::parse(filter)
                        .with_context(|| format!("Invalid filter {}", filter))
                })
                .collect::<Result<Vec<_>>>()?;
            let selection = if show.is_empty() {
                Selection {
                    filters,
                    ..Selection::default()
                }
            } else {
                Selection::new(show.iter().copied(), filters)
            };
            let path = introspector.lookup_path(handle)?;
            Ok(render_lookup_path(introspector, &path, &selection, *width)?)
        }

        Command::Singleton { .. } => match introspector.singleton_instance(handle)? {
            Some(attached) => Ok(loaded.label_of(attached)),
            None => Ok("(not a singleton class)".to_string()),
        },
    }
}
