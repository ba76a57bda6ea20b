//! Shared object models for integration tests
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;

use looksee_core::{
    Handle, HostModel, MethodDescriptor, MethodId, ModuleId, NodeKind, ObjectId, ObjectSpace,
    Representation, Visibility,
};

pub fn direct(file: &str, host_line: u32) -> Representation {
    Representation::Direct {
        file: file.to_string(),
        line: host_line,
    }
}

/// `A < B`, with `A#foo` defined at a.rb line 4 (host line 3).
pub struct SimpleHierarchy {
    pub space: ObjectSpace,
    pub a: ModuleId,
    pub b: ModuleId,
    pub foo: MethodId,
}

pub fn simple_hierarchy() -> SimpleHierarchy {
    let mut space = ObjectSpace::new();
    let b = space.define_class("B", None).unwrap();
    let a = space.define_class("A", Some(b)).unwrap();
    let foo = space
        .define_method(a, "foo", Visibility::Public, direct("a.rb", 3))
        .unwrap();
    SimpleHierarchy { space, a, b, foo }
}

/// `Derived < Base < Object`, including `Mod1` then `Mod2`, plus an instance
/// with a singleton method.
pub struct MixinHierarchy {
    pub space: ObjectSpace,
    pub base: ModuleId,
    pub derived: ModuleId,
    pub mod1: ModuleId,
    pub mod2: ModuleId,
    pub instance: ObjectId,
}

pub fn mixin_hierarchy() -> MixinHierarchy {
    let mut space = ObjectSpace::with_core_classes();
    let object = space.lookup_constant("Object").unwrap();
    let base = space.define_class("Base", Some(object)).unwrap();
    let derived = space.define_class("Derived", Some(base)).unwrap();
    let mod1 = space.define_module("Mod1").unwrap();
    let mod2 = space.define_module("Mod2").unwrap();
    space.include_module(derived, mod1).unwrap();
    space.include_module(derived, mod2).unwrap();

    space
        .define_method(base, "greet", Visibility::Public, direct("base.rb", 1))
        .unwrap();
    space
        .define_method(base, "secret", Visibility::Private, direct("base.rb", 5))
        .unwrap();
    space
        .define_method(mod1, "helper", Visibility::Protected, direct("mod1.rb", 2))
        .unwrap();
    space
        .define_method(derived, "greet", Visibility::Public, direct("derived.rb", 7))
        .unwrap();
    space.undef_method(derived, "secret").unwrap();

    let instance = space.new_object(derived).unwrap();
    let singleton = space.singleton_class_of(Handle::Object(instance)).unwrap();
    space
        .define_method(singleton, "only_me", Visibility::Public, direct("main.rb", 10))
        .unwrap();

    MixinHierarchy {
        space,
        base,
        derived,
        mod1,
        mod2,
        instance,
    }
}

/// A host model whose superclass relation loops, which a real runtime never
/// produces.
pub struct LoopingModel;

impl HostModel for LoopingModel {
    fn contains(&self, _handle: Handle) -> bool {
        true
    }

    fn type_name_of(&self, _handle: Handle) -> String {
        "Class".to_string()
    }

    fn node_kind(&self, _node: ModuleId) -> NodeKind {
        NodeKind::Class
    }

    fn module_name(&self, node: ModuleId) -> String {
        format!("Loop{}", node.0)
    }

    fn superclass_of(&self, node: ModuleId) -> Option<ModuleId> {
        Some(ModuleId((node.0 + 1) % 2))
    }

    fn effective_class_of(&self, _object: ObjectId) -> ModuleId {
        ModuleId(0)
    }

    fn own_method_table_of(&self, _node: ModuleId) -> BTreeMap<String, MethodId> {
        BTreeMap::from([("again".to_string(), MethodId(0))])
    }

    fn method_descriptor(&self, method: MethodId) -> Option<MethodDescriptor> {
        Some(MethodDescriptor {
            name: "again".to_string(),
            owner: ModuleId(0),
            visibility: Visibility::Public,
            is_undefined: false,
            representation: Representation::Alias { target: method },
        })
    }

    fn singleton_attachment(&self, _node: ModuleId) -> Option<Handle> {
        None
    }

    fn included_module_of(&self, _node: ModuleId) -> Option<ModuleId> {
        None
    }
}

/// Delegates to an inner model, counting `superclass_of` calls.
pub struct CountingModel<'a, M: HostModel> {
    pub inner: &'a M,
    pub superclass_calls: Cell<usize>,
}

impl<'a, M: HostModel> CountingModel<'a, M> {
    pub fn new(inner: &'a M) -> Self {
        Self {
            inner,
            superclass_calls: Cell::new(0),
        }
    }
}

impl<M: HostModel> HostModel for CountingModel<'_, M> {
    fn contains(&self, handle: Handle) -> bool {
        self.inner.contains(handle)
    }

    fn type_name_of(&self, handle: Handle) -> String {
        self.inner.type_name_of(handle)
    }

    fn node_kind(&self, node: ModuleId) -> NodeKind {
        self.inner.node_kind(node)
    }

    fn module_name(&self, node: ModuleId) -> String {
        self.inner.module_name(node)
    }

    fn superclass_of(&self, node: ModuleId) -> Option<ModuleId> {
        self.superclass_calls.set(self.superclass_calls.get() + 1);
        self.inner.superclass_of(node)
    }

    fn effective_class_of(&self, object: ObjectId) -> ModuleId {
        self.inner.effective_class_of(object)
    }

    fn own_method_table_of(&self, node: ModuleId) -> BTreeMap<String, MethodId> {
        self.inner.own_method_table_of(node)
    }

    fn method_descriptor(&self, method: MethodId) -> Option<MethodDescriptor> {
        self.inner.method_descriptor(method)
    }

    fn singleton_attachment(&self, node: ModuleId) -> Option<Handle> {
        self.inner.singleton_attachment(node)
    }

    fn included_module_of(&self, node: ModuleId) -> Option<ModuleId> {
        self.inner.included_module_of(node)
    }
}
