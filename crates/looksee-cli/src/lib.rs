//! Library interface for the looksee CLI

pub mod columnizer;
pub mod commands;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use looksee_core::{Introspector, IntrospectorConfig, LoadedModel, ModelSnapshot, SingletonInstanceMode};
use tracing::debug;

use crate::commands::{execute, Command};

/// Load a model snapshot from disk and build it.
pub fn load_model(path: &Path) -> Result<LoadedModel> {
    let snapshot = ModelSnapshot::load(path)
        .with_context(|| format!("Failed to read model snapshot: {:?}", path))?;
    snapshot
        .build()
        .with_context(|| format!("Failed to build model from {:?}", path))
}

/// Read the introspector configuration, falling back to the defaults.
pub fn load_config(
    path: Option<&Path>,
    singleton_mode: Option<SingletonInstanceMode>,
) -> Result<IntrospectorConfig> {
    let mut config = match path {
        Some(path) => IntrospectorConfig::load(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?,
        None => IntrospectorConfig::default(),
    };
    if let Some(mode) = singleton_mode {
        config = config.with_singleton_mode(mode);
    }
    config.validate()?;
    Ok(config)
}

/// Resolve the command's target in `loaded` and run it.
pub fn run(command: &Command, loaded: &mut LoadedModel, config: IntrospectorConfig) -> Result<String> {
    let target = command.target();
    let handle = loaded
        .materialize_target(target)
        .with_context(|| format!("Can't resolve target {}", target))?;
    debug!("Running {:?} on {}", command, loaded.label_of(handle));
    let loaded: &LoadedModel = loaded;
    let introspector = Introspector::with_config(&loaded.space, config);
    execute(command, handle, loaded, &introspector)
}
