//! Serialized object model snapshots
//!
//! A snapshot lists modules and named objects with their methods. Building it
//! replays those definitions into an [`ObjectSpace`], in the order they are
//! declared, the way the runtime would have executed them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ancestry::DEFAULT_MAX_ANCESTRY_STEPS;
use crate::describe::describe_module;
use crate::error::LoadError;
use crate::host::HostModel;
use crate::model::{Handle, ModuleId, ObjectId, Representation, Visibility};
use crate::object_space::ObjectSpace;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSnapshot {
    /// Start from `BasicObject`, `Object`, `Kernel`, `Module` and `Class`
    #[serde(default = "default_true")]
    pub core_classes: bool,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSpecKind {
    #[default]
    Class,
    Module,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleSpecKind,
    /// Defaults to `Object` for classes when core classes are present
    pub superclass: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
    #[serde(default)]
    pub singleton_methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub singleton_methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub source: MethodSource,
}

/// How a snapshot method came to be. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodSource {
    Direct { file: String, line: u32 },
    Closure { file: String, line: u32 },
    /// Alias of the method `of` resolves to from the owner
    Alias { of: String },
    /// Inherited method of the same name with new visibility
    Rewrap,
    /// Bound from the method `of` resolves to from the owner
    Bound { of: String },
    Native,
    Undefined,
}

/// A built snapshot: the object space plus its named objects.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub space: ObjectSpace,
    pub objects: BTreeMap<String, ObjectId>,
}

impl LoadedModel {
    /// Resolve `@name` to a named object, anything else to a constant.
    pub fn resolve_target(&self, target: &str) -> Option<Handle> {
        match target.strip_prefix('@') {
            Some(name) => self.objects.get(name).copied().map(Handle::Object),
            None => self.space.lookup_constant(target).map(Handle::Module),
        }
    }

    /// Like [`resolve_target`](Self::resolve_target), but `[target]` names
    /// the singleton class of `target`, which is created if it doesn't exist
    /// yet.
    pub fn materialize_target(&mut self, target: &str) -> Result<Handle, LoadError> {
        if let Some(inner) = target
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let attached = self.materialize_target(inner)?;
            return Ok(Handle::Module(self.space.singleton_class_of(attached)?));
        }
        self.resolve_target(target)
            .ok_or_else(|| match target.strip_prefix('@') {
                Some(name) => LoadError::InvalidModel(format!("no object named @{}", name)),
                None => LoadError::UnknownConstant(target.to_string()),
            })
    }

    /// Short label for a handle: `@name` for named objects, the bracketed
    /// description for singleton classes.
    pub fn label_of(&self, handle: Handle) -> String {
        match handle {
            Handle::Object(object) => match self.objects.iter().find(|(_, id)| **id == object) {
                Some((name, _)) => format!("@{}", name),
                None => format!("#<{}>", self.space.type_name_of(handle)),
            },
            Handle::Module(module) if self.space.is_singleton_class(module) => {
                describe_module(&self.space, module, DEFAULT_MAX_ANCESTRY_STEPS)
                    .unwrap_or_else(|_| self.space.display_name_of(module))
            }
            Handle::Module(module) => self.space.display_name_of(module),
            Handle::Method(_) => format!("#<{}>", self.space.type_name_of(handle)),
        }
    }
}

impl ModelSnapshot {
    pub fn from_yaml_str(input: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a snapshot, choosing JSON or YAML by file extension.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        debug!("Reading model snapshot {}", path.display());
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn build(&self) -> Result<LoadedModel, LoadError> {
        let mut space = if self.core_classes {
            ObjectSpace::with_core_classes()
        } else {
            ObjectSpace::new()
        };

        let mut declared = Vec::with_capacity(self.modules.len());
        for spec in &self.modules {
            let id = match spec.kind {
                ModuleSpecKind::Module => {
                    if spec.superclass.is_some() {
                        return Err(LoadError::InvalidModel(format!(
                            "module {} can't have a superclass",
                            spec.name
                        )));
                    }
                    space.define_module(&spec.name)?
                }
                ModuleSpecKind::Class => {
                    let superclass = match &spec.superclass {
                        Some(name) => Some(space.require_constant(name)?),
                        None => space.lookup_constant("Object"),
                    };
                    space.define_class(&spec.name, superclass)?
                }
            };
            declared.push(id);
        }

        for (spec, &id) in self.modules.iter().zip(&declared) {
            for name in &spec.includes {
                let module = space.require_constant(name)?;
                space.include_module(id, module)?;
            }
        }

        for (spec, &id) in self.modules.iter().zip(&declared) {
            apply_methods(&mut space, id, &spec.methods)?;
            if !spec.singleton_methods.is_empty() {
                let singleton = space.singleton_class_of(Handle::Module(id))?;
                apply_methods(&mut space, singleton, &spec.singleton_methods)?;
            }
        }

        let mut objects = BTreeMap::new();
        for spec in &self.objects {
            if objects.contains_key(&spec.name) {
                return Err(LoadError::InvalidModel(format!(
                    "object @{} is declared twice",
                    spec.name
                )));
            }
            let class = space.require_constant(&spec.class)?;
            let object = space.new_object(class)?;
            if !spec.singleton_methods.is_empty() {
                let singleton = space.singleton_class_of(Handle::Object(object))?;
                apply_methods(&mut space, singleton, &spec.singleton_methods)?;
            }
            objects.insert(spec.name.clone(), object);
        }

        info!(
            "Loaded {} modules and {} objects",
            self.modules.len(),
            objects.len()
        );
        Ok(LoadedModel { space, objects })
    }
}

fn apply_methods(
    space: &mut ObjectSpace,
    owner: ModuleId,
    methods: &[MethodSpec],
) -> Result<(), LoadError> {
    for spec in methods {
        apply_method(space, owner, spec)?;
    }
    Ok(())
}

fn apply_method(space: &mut ObjectSpace, owner: ModuleId, spec: &MethodSpec) -> Result<(), LoadError> {
    let name = spec.name.as_str();
    match &spec.source {
        MethodSource::Direct { file, line } => {
            space.define_method(
                owner,
                name,
                spec.visibility,
                Representation::Direct {
                    file: file.clone(),
                    line: host_line(name, *line)?,
                },
            )?;
        }
        MethodSource::Closure { file, line } => {
            space.define_method(
                owner,
                name,
                spec.visibility,
                Representation::ClosureBacked {
                    file: file.clone(),
                    line: host_line(name, *line)?,
                },
            )?;
        }
        MethodSource::Alias { of } => {
            space.alias_method(owner, name, of)?;
            space.set_visibility(owner, name, spec.visibility)?;
        }
        MethodSource::Rewrap => {
            space.set_visibility(owner, name, spec.visibility)?;
        }
        MethodSource::Bound { of } => {
            let unbound = space
                .find_method(owner, of)
                .ok_or_else(|| LoadError::UndefinedMethod {
                    owner: space.module_name(owner),
                    name: of.clone(),
                })?;
            space.bind_method(owner, name, spec.visibility, unbound)?;
        }
        MethodSource::Native => {
            space.define_method(owner, name, spec.visibility, Representation::Opaque)?;
        }
        MethodSource::Undefined => {
            space.undef_method(owner, name)?;
        }
    }
    Ok(())
}

/// Snapshot lines are 1-based; the host model stores them 0-based.
fn host_line(method: &str, line: u32) -> Result<u32, LoadError> {
    line.checked_sub(1).ok_or_else(|| {
        LoadError::InvalidModel(format!(
            "method {} has line 0 (lines start at 1)",
            method
        ))
    })
}
