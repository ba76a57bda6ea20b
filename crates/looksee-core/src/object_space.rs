//! In-memory object model
//!
//! [`ObjectSpace`] is an arena of modules, objects and method entries that
//! behaves like a class-and-module runtime: included modules become link nodes
//! in the superclass chain, singleton classes are created on demand, and
//! aliases, visibility changes and bound methods produce indirect entries.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::error::LoadError;
use crate::host::HostModel;
use crate::model::{
    Handle, MethodDescriptor, MethodId, ModuleId, NodeKind, ObjectId, Representation, Visibility,
};

#[derive(Debug, Clone)]
struct ModuleEntry {
    name: String,
    kind: NodeKind,
    superclass: Option<ModuleId>,
    methods: BTreeMap<String, MethodId>,
    /// Wrapped module, links only
    included: Option<ModuleId>,
    /// Attached value, singleton classes only
    attached: Option<Handle>,
    singleton: Option<ModuleId>,
}

impl ModuleEntry {
    fn new(name: impl Into<String>, kind: NodeKind, superclass: Option<ModuleId>) -> Self {
        Self {
            name: name.into(),
            kind,
            superclass,
            methods: BTreeMap::new(),
            included: None,
            attached: None,
            singleton: None,
        }
    }
}

#[derive(Debug, Clone)]
struct ObjectEntry {
    class: ModuleId,
    singleton: Option<ModuleId>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSpace {
    modules: Vec<ModuleEntry>,
    objects: Vec<ObjectEntry>,
    methods: Vec<MethodDescriptor>,
    constants: HashMap<String, ModuleId>,
}

impl ObjectSpace {
    /// An empty space with no predefined classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A space holding `BasicObject`, `Object`, `Kernel` (included into
    /// `Object`), `Module` and `Class`.
    pub fn with_core_classes() -> Self {
        let mut space = Self::new();
        space.bootstrap();
        space
    }

    fn bootstrap(&mut self) {
        let basic_object = self.push_module(ModuleEntry::new("BasicObject", NodeKind::Class, None));
        let object = self.push_module(ModuleEntry::new(
            "Object",
            NodeKind::Class,
            Some(basic_object),
        ));
        let kernel = self.push_module(ModuleEntry::new("Kernel", NodeKind::Module, None));
        let module = self.push_module(ModuleEntry::new("Module", NodeKind::Class, Some(object)));
        let class = self.push_module(ModuleEntry::new("Class", NodeKind::Class, Some(module)));
        for id in [basic_object, object, kernel, module, class] {
            let name = self.modules[id.0 as usize].name.clone();
            self.constants.insert(name, id);
        }
        let link = self.push_link(kernel, Some(basic_object));
        self.modules[object.0 as usize].superclass = Some(link);
    }

    pub fn lookup_constant(&self, name: &str) -> Option<ModuleId> {
        self.constants.get(name).copied()
    }

    /// Look up a constant and fail if it is missing.
    pub fn require_constant(&self, name: &str) -> Result<ModuleId, LoadError> {
        self.lookup_constant(name)
            .ok_or_else(|| LoadError::UnknownConstant(name.to_string()))
    }

    pub fn define_class(
        &mut self,
        name: &str,
        superclass: Option<ModuleId>,
    ) -> Result<ModuleId, LoadError> {
        self.ensure_undefined_constant(name)?;
        let id = self.anonymous_class(superclass)?;
        self.modules[id.0 as usize].name = name.to_string();
        self.constants.insert(name.to_string(), id);
        debug!("Defined class {}", name);
        Ok(id)
    }

    pub fn anonymous_class(&mut self, superclass: Option<ModuleId>) -> Result<ModuleId, LoadError> {
        if let Some(parent) = superclass {
            let kind = self.entry(parent)?.kind;
            if kind != NodeKind::Class {
                return Err(LoadError::InvalidModel(format!(
                    "superclass must be a class, got {}",
                    kind
                )));
            }
        }
        Ok(self.push_module(ModuleEntry::new("", NodeKind::Class, superclass)))
    }

    pub fn define_module(&mut self, name: &str) -> Result<ModuleId, LoadError> {
        self.ensure_undefined_constant(name)?;
        let id = self.anonymous_module();
        self.modules[id.0 as usize].name = name.to_string();
        self.constants.insert(name.to_string(), id);
        debug!("Defined module {}", name);
        Ok(id)
    }

    pub fn anonymous_module(&mut self) -> ModuleId {
        self.push_module(ModuleEntry::new("", NodeKind::Module, None))
    }

    pub fn new_object(&mut self, class: ModuleId) -> Result<ObjectId, LoadError> {
        let kind = self.entry(class)?.kind;
        if kind != NodeKind::Class {
            return Err(LoadError::InvalidModel(format!(
                "can't instantiate a {}",
                kind
            )));
        }
        self.objects.push(ObjectEntry {
            class,
            singleton: None,
        });
        Ok(ObjectId((self.objects.len() - 1) as u32))
    }

    /// Mix `module` (and the modules it includes) into `target`.
    ///
    /// Links are inserted directly above `target`, so the most recent include
    /// takes precedence over earlier ones. Modules already in `target`'s
    /// chain are skipped.
    pub fn include_module(&mut self, target: ModuleId, module: ModuleId) -> Result<(), LoadError> {
        let target_kind = self.entry(target)?.kind;
        if target_kind == NodeKind::IncludedModuleLink {
            return Err(LoadError::InvalidModel(
                "can't include into an included module link".to_string(),
            ));
        }
        let kind = self.entry(module)?.kind;
        if kind != NodeKind::Module {
            return Err(LoadError::InvalidModel(format!(
                "wrong argument type {} (expected module)",
                kind
            )));
        }

        // The module itself, then whatever it includes, in precedence order.
        let mut to_insert = vec![module];
        let mut cursor = self.entry(module)?.superclass;
        while let Some(link) = cursor {
            let entry = self.entry(link)?;
            if let Some(inner) = entry.included {
                to_insert.push(inner);
            }
            cursor = entry.superclass;
        }

        let mut insertion_point = target;
        for inner in to_insert {
            if self.chain_includes(target, inner) {
                trace!("Skipping {} already in chain", inner);
                continue;
            }
            let above = self.entry(insertion_point)?.superclass;
            let link = self.push_link(inner, above);
            self.modules[insertion_point.0 as usize].superclass = Some(link);
            insertion_point = link;
        }
        Ok(())
    }

    fn chain_includes(&self, start: ModuleId, module: ModuleId) -> bool {
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            if node == module || self.included_module_of(node) == Some(module) {
                return true;
            }
            cursor = self.superclass_of(node);
        }
        false
    }

    /// The singleton class of `handle`, creating it (and the singleton
    /// classes it inherits from) if needed.
    pub fn singleton_class_of(&mut self, handle: Handle) -> Result<ModuleId, LoadError> {
        match handle {
            Handle::Object(object) => {
                let entry = self.object(object)?.clone();
                if let Some(existing) = entry.singleton {
                    return Ok(existing);
                }
                let mut singleton =
                    ModuleEntry::new("", NodeKind::SingletonClass, Some(entry.class));
                singleton.attached = Some(handle);
                let id = self.push_module(singleton);
                self.objects[object.0 as usize].singleton = Some(id);
                Ok(id)
            }
            Handle::Module(module) => {
                let entry = self.entry(module)?.clone();
                if let Some(existing) = entry.singleton {
                    return Ok(existing);
                }
                let superclass = match entry.kind {
                    NodeKind::Class | NodeKind::SingletonClass => {
                        match self.real_superclass(module) {
                            Some(parent) => Some(self.singleton_class_of(Handle::Module(parent))?),
                            None => self.lookup_constant("Class"),
                        }
                    }
                    NodeKind::Module => self.lookup_constant("Module"),
                    NodeKind::IncludedModuleLink => {
                        return Err(LoadError::InvalidModel(
                            "an included module link has no singleton class".to_string(),
                        ))
                    }
                };
                let mut singleton = ModuleEntry::new("", NodeKind::SingletonClass, superclass);
                singleton.attached = Some(handle);
                let id = self.push_module(singleton);
                self.modules[module.0 as usize].singleton = Some(id);
                Ok(id)
            }
            Handle::Method(method) => Err(LoadError::InvalidModel(format!(
                "can't define a singleton class for {}",
                method
            ))),
        }
    }

    /// First superclass that is not an included-module link.
    fn real_superclass(&self, node: ModuleId) -> Option<ModuleId> {
        let mut cursor = self.superclass_of(node);
        while let Some(parent) = cursor {
            if !self.is_included_link(parent) {
                return Some(parent);
            }
            cursor = self.superclass_of(parent);
        }
        None
    }

    pub fn define_method(
        &mut self,
        owner: ModuleId,
        name: &str,
        visibility: Visibility,
        representation: Representation,
    ) -> Result<MethodId, LoadError> {
        let table_owner = self.method_owner(owner)?;
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(MethodDescriptor {
            name: name.to_string(),
            owner: table_owner,
            visibility,
            is_undefined: false,
            representation,
        });
        self.modules[table_owner.0 as usize]
            .methods
            .insert(name.to_string(), id);
        trace!("Defined {} on {} as {}", name, table_owner, id);
        Ok(id)
    }

    /// Define `new_name` as an alias of the method `old_name` resolves to
    /// from `owner`.
    pub fn alias_method(
        &mut self,
        owner: ModuleId,
        new_name: &str,
        old_name: &str,
    ) -> Result<MethodId, LoadError> {
        let target = self.require_method(owner, old_name)?;
        let visibility = self.methods[target.0 as usize].visibility;
        self.define_method(
            owner,
            new_name,
            visibility,
            Representation::Alias { target },
        )
    }

    /// Change the visibility of `name` as seen from `owner`.
    ///
    /// A local entry is updated in place; an inherited method gets a local
    /// wrapper carrying the new visibility.
    pub fn set_visibility(
        &mut self,
        owner: ModuleId,
        name: &str,
        visibility: Visibility,
    ) -> Result<MethodId, LoadError> {
        let table_owner = self.method_owner(owner)?;
        if let Some(&local) = self.modules[table_owner.0 as usize].methods.get(name) {
            if !self.methods[local.0 as usize].is_undefined {
                self.methods[local.0 as usize].visibility = visibility;
                return Ok(local);
            }
        }
        let inner = self.require_method(owner, name)?;
        self.define_method(owner, name, visibility, Representation::Wrapper { inner })
    }

    /// Define `name` on `owner` as a method bound from `unbound`.
    pub fn bind_method(
        &mut self,
        owner: ModuleId,
        name: &str,
        visibility: Visibility,
        unbound: MethodId,
    ) -> Result<MethodId, LoadError> {
        if unbound.0 as usize >= self.methods.len() {
            return Err(LoadError::InvalidModel(format!("no such method {}", unbound)));
        }
        self.define_method(
            owner,
            name,
            visibility,
            Representation::BoundFromUnbound { unbound },
        )
    }

    /// Leave a tombstone for `name` on `owner`, stopping resolution there.
    pub fn undef_method(&mut self, owner: ModuleId, name: &str) -> Result<MethodId, LoadError> {
        let previous = self.require_method(owner, name)?;
        let visibility = self.methods[previous.0 as usize].visibility;
        let id = self.define_method(owner, name, visibility, Representation::Opaque)?;
        self.methods[id.0 as usize].is_undefined = true;
        Ok(id)
    }

    /// Drop the local entry for `name`, exposing any inherited method again.
    pub fn remove_method(&mut self, owner: ModuleId, name: &str) -> Result<MethodId, LoadError> {
        let table_owner = self.method_owner(owner)?;
        self.modules[table_owner.0 as usize]
            .methods
            .remove(name)
            .ok_or_else(|| self.undefined_method(owner, name))
    }

    /// Resolve `name` from `start` the way a method call would.
    pub fn find_method(&self, start: ModuleId, name: &str) -> Option<MethodId> {
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            if let Some(&id) = self.own_method_table(node).and_then(|table| table.get(name)) {
                return if self.methods[id.0 as usize].is_undefined {
                    None
                } else {
                    Some(id)
                };
            }
            cursor = self.superclass_of(node);
        }
        None
    }

    fn require_method(&self, owner: ModuleId, name: &str) -> Result<MethodId, LoadError> {
        self.find_method(owner, name)
            .ok_or_else(|| self.undefined_method(owner, name))
    }

    fn undefined_method(&self, owner: ModuleId, name: &str) -> LoadError {
        LoadError::UndefinedMethod {
            owner: self.describe_owner(owner),
            name: name.to_string(),
        }
    }

    fn describe_owner(&self, owner: ModuleId) -> String {
        let name = self.module_name(owner);
        if name.is_empty() {
            owner.to_string()
        } else {
            name
        }
    }

    /// The node whose table holds methods defined on `owner`.
    fn method_owner(&self, owner: ModuleId) -> Result<ModuleId, LoadError> {
        let entry = self.entry(owner)?;
        if entry.kind == NodeKind::IncludedModuleLink {
            return Err(LoadError::InvalidModel(
                "can't define methods on an included module link".to_string(),
            ));
        }
        Ok(owner)
    }

    fn own_method_table(&self, node: ModuleId) -> Option<&BTreeMap<String, MethodId>> {
        let entry = self.modules.get(node.0 as usize)?;
        // Links share the method table of the module they wrap.
        match entry.included {
            Some(inner) => self.modules.get(inner.0 as usize).map(|e| &e.methods),
            None => Some(&entry.methods),
        }
    }

    fn entry(&self, id: ModuleId) -> Result<&ModuleEntry, LoadError> {
        self.modules
            .get(id.0 as usize)
            .ok_or_else(|| LoadError::InvalidModel(format!("no such module {}", id)))
    }

    fn object(&self, id: ObjectId) -> Result<&ObjectEntry, LoadError> {
        self.objects
            .get(id.0 as usize)
            .ok_or_else(|| LoadError::InvalidModel(format!("no such object {}", id)))
    }

    fn ensure_undefined_constant(&self, name: &str) -> Result<(), LoadError> {
        if name.is_empty() {
            return Err(LoadError::InvalidModel("constant name is empty".to_string()));
        }
        if self.constants.contains_key(name) {
            return Err(LoadError::DuplicateConstant(name.to_string()));
        }
        Ok(())
    }

    fn push_module(&mut self, entry: ModuleEntry) -> ModuleId {
        self.modules.push(entry);
        ModuleId((self.modules.len() - 1) as u32)
    }

    fn push_link(&mut self, module: ModuleId, superclass: Option<ModuleId>) -> ModuleId {
        let name = self.modules[module.0 as usize].name.clone();
        let mut link = ModuleEntry::new(name, NodeKind::IncludedModuleLink, superclass);
        link.included = Some(module);
        self.push_module(link)
    }
}

impl HostModel for ObjectSpace {
    fn contains(&self, handle: Handle) -> bool {
        match handle {
            Handle::Module(id) => (id.0 as usize) < self.modules.len(),
            Handle::Object(id) => (id.0 as usize) < self.objects.len(),
            Handle::Method(id) => (id.0 as usize) < self.methods.len(),
        }
    }

    fn type_name_of(&self, handle: Handle) -> String {
        match handle {
            Handle::Module(id) => match self.modules.get(id.0 as usize).map(|e| e.kind) {
                Some(NodeKind::Class) | Some(NodeKind::SingletonClass) => "Class".to_string(),
                Some(NodeKind::Module) => "Module".to_string(),
                Some(NodeKind::IncludedModuleLink) => "IncludedModule".to_string(),
                None => "<dead module>".to_string(),
            },
            Handle::Object(id) => match self.objects.get(id.0 as usize) {
                Some(entry) => {
                    let name = self.module_name(entry.class);
                    if name.is_empty() {
                        "unnamed Class".to_string()
                    } else {
                        name
                    }
                }
                None => "<dead object>".to_string(),
            },
            Handle::Method(_) => "UnboundMethod".to_string(),
        }
    }

    fn node_kind(&self, node: ModuleId) -> NodeKind {
        self.modules
            .get(node.0 as usize)
            .map(|entry| entry.kind)
            .unwrap_or(NodeKind::Class)
    }

    fn module_name(&self, node: ModuleId) -> String {
        self.modules
            .get(node.0 as usize)
            .map(|entry| entry.name.clone())
            .unwrap_or_default()
    }

    fn superclass_of(&self, node: ModuleId) -> Option<ModuleId> {
        self.modules.get(node.0 as usize)?.superclass
    }

    fn effective_class_of(&self, object: ObjectId) -> ModuleId {
        let entry = &self.objects[object.0 as usize];
        entry.singleton.unwrap_or(entry.class)
    }

    fn own_method_table_of(&self, node: ModuleId) -> BTreeMap<String, MethodId> {
        self.own_method_table(node).cloned().unwrap_or_default()
    }

    fn method_descriptor(&self, method: MethodId) -> Option<MethodDescriptor> {
        self.methods.get(method.0 as usize).cloned()
    }

    fn singleton_attachment(&self, node: ModuleId) -> Option<Handle> {
        self.modules.get(node.0 as usize)?.attached
    }

    fn included_module_of(&self, node: ModuleId) -> Option<ModuleId> {
        self.modules.get(node.0 as usize)?.included
    }
}
