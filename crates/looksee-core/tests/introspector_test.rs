//! Query facade behaviour on representative object models

mod fixtures;

use std::collections::BTreeSet;

use fixtures::{direct, mixin_hierarchy, simple_hierarchy};
use looksee_core::{
    Handle, HostModel, InspectError, Introspector, IntrospectorConfig, MethodId, ModuleId,
    ObjectSpace, Origin, SingletonInstanceMode, SourceLocation, Visibility,
};
use pretty_assertions::assert_eq;

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn described(introspector: &Introspector<'_, ObjectSpace>, handle: Handle) -> Vec<String> {
    introspector
        .ancestry_of(handle)
        .unwrap()
        .modules()
        .map(|module| introspector.describe_module(module).unwrap())
        .collect()
}

#[test]
fn test_two_class_scenario() {
    let fixture = simple_hierarchy();
    let introspector = Introspector::new(&fixture.space);

    let chain = introspector.ancestry_of(fixture.a).unwrap();
    assert_eq!(chain.modules().collect::<Vec<_>>(), vec![fixture.a, fixture.b]);
    assert_eq!(introspector.public_methods(fixture.a).unwrap(), names(&["foo"]));
    assert_eq!(
        introspector.origin_of(fixture.foo).unwrap(),
        Origin::Resolved(SourceLocation::new("a.rb", 4))
    );
}

#[test]
fn test_mixin_lookup_order() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);

    assert_eq!(
        described(&introspector, Handle::Module(fixture.derived)),
        vec!["Derived", "Mod2", "Mod1", "Base", "Object", "Kernel", "BasicObject"]
    );
    assert_eq!(
        described(&introspector, Handle::Object(fixture.instance)),
        vec![
            "[Derived instance]",
            "Derived",
            "Mod2",
            "Mod1",
            "Base",
            "Object",
            "Kernel",
            "BasicObject"
        ]
    );
}

#[test]
fn test_class_singleton_chain() {
    let mut space = ObjectSpace::with_core_classes();
    let object = space.lookup_constant("Object").unwrap();
    let c = space.define_class("C", Some(object)).unwrap();
    let meta = space.singleton_class_of(Handle::Module(c)).unwrap();
    let introspector = Introspector::new(&space);

    assert_eq!(
        described(&introspector, Handle::Module(meta)),
        vec![
            "[C]",
            "[Object]",
            "[BasicObject]",
            "Class",
            "Module",
            "Object",
            "Kernel",
            "BasicObject"
        ]
    );
}

#[test]
fn test_included_link_scenario() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let chain = introspector.ancestry_of(fixture.derived).unwrap();
    let link = chain.links()[2].module;

    assert_eq!(introspector.display_name(link).unwrap(), "Mod1 (included)");
    assert!(introspector.is_included_link(link).unwrap());
    assert!(!introspector.is_included_link(fixture.mod1).unwrap());
    assert_eq!(introspector.canonical_class(link).unwrap(), fixture.mod1);
    assert_eq!(introspector.canonical_class(fixture.mod1).unwrap(), fixture.mod1);
    assert_eq!(introspector.display_name(fixture.mod2).unwrap(), "Mod2");
}

#[test]
fn test_visibility_queries() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);

    assert_eq!(introspector.public_methods(fixture.derived).unwrap(), names(&["greet"]));
    assert_eq!(introspector.undefined_methods(fixture.derived).unwrap(), names(&["secret"]));
    assert!(introspector.private_methods(fixture.derived).unwrap().is_empty());
    assert_eq!(introspector.private_methods(fixture.base).unwrap(), names(&["secret"]));
    assert_eq!(introspector.protected_methods(fixture.mod1).unwrap(), names(&["helper"]));

    // A link reports the methods of the module it wraps.
    let chain = introspector.ancestry_of(fixture.derived).unwrap();
    let link = chain.links()[2].module;
    assert_eq!(introspector.protected_methods(link).unwrap(), names(&["helper"]));
}

#[test]
fn test_visibility_query_on_non_module_names_actual_type() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);

    let err = introspector.public_methods(fixture.instance).unwrap_err();
    assert_eq!(
        err,
        InspectError::TypeKind {
            expected: "module".to_string(),
            actual: "Derived".to_string(),
        }
    );
    assert!(err.to_string().contains("Derived"));

    let greet = fixture.space.find_method(fixture.derived, "greet").unwrap();
    let err = introspector.undefined_methods(greet).unwrap_err();
    assert!(err.is_type_kind());
    assert!(err.to_string().contains("UnboundMethod"));
}

#[test]
fn test_singleton_instance_strict_mode() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let singleton = fixture.space.effective_class_of(fixture.instance);

    assert!(introspector.is_singleton_class(singleton).unwrap());
    assert_eq!(
        introspector.singleton_instance(singleton).unwrap(),
        Some(Handle::Object(fixture.instance))
    );

    let err = introspector.singleton_instance(fixture.derived).unwrap_err();
    assert_eq!(err, InspectError::type_kind("singleton class", "Class"));
    let err = introspector.singleton_instance(fixture.instance).unwrap_err();
    assert!(err.is_type_kind());
}

#[test]
fn test_singleton_instance_lenient_mode() {
    let fixture = mixin_hierarchy();
    let config = IntrospectorConfig::default().with_singleton_mode(SingletonInstanceMode::Lenient);
    let introspector = Introspector::with_config(&fixture.space, config);
    let singleton = fixture.space.effective_class_of(fixture.instance);

    assert_eq!(
        introspector.singleton_instance(singleton).unwrap(),
        Some(Handle::Object(fixture.instance))
    );
    assert_eq!(introspector.singleton_instance(fixture.derived).unwrap(), None);
    assert_eq!(introspector.singleton_instance(fixture.mod1).unwrap(), None);
    assert_eq!(introspector.singleton_instance(fixture.instance).unwrap(), None);
}

#[test]
fn test_singleton_of_singleton_returns_singleton() {
    let mut space = ObjectSpace::with_core_classes();
    let object = space.lookup_constant("Object");
    let class = space.anonymous_class(object).unwrap();
    let meta = space.singleton_class_of(Handle::Module(class)).unwrap();
    let meta_meta = space.singleton_class_of(Handle::Module(meta)).unwrap();
    let introspector = Introspector::new(&space);

    assert_eq!(
        introspector.singleton_instance(meta_meta).unwrap(),
        Some(Handle::Module(meta))
    );
    assert_eq!(introspector.describe_module(meta_meta).unwrap(), "[[unnamed Class]]");
}

#[test]
fn test_origin_requires_method_handle() {
    let fixture = simple_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let err = introspector.origin_of(fixture.a).unwrap_err();
    assert_eq!(err, InspectError::type_kind("method", "Class"));
}

#[test]
fn test_ancestry_rejects_method_handles() {
    let fixture = simple_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let err = introspector.ancestry_of(fixture.foo).unwrap_err();
    assert!(err.is_type_kind());
}

#[test]
fn test_stale_handles_are_internal_errors() {
    let fixture = simple_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    assert!(introspector.ancestry_of(ModuleId(99)).unwrap_err().is_internal());
    assert!(introspector.origin_of(MethodId(99)).unwrap_err().is_internal());
    assert!(introspector.display_name(ModuleId(99)).unwrap_err().is_internal());
}

#[test]
fn test_queries_see_model_changes_between_calls() {
    let mut space = ObjectSpace::new();
    let class = space.define_class("C", None).unwrap();
    space
        .define_method(class, "before", Visibility::Public, direct("c.rb", 0))
        .unwrap();
    {
        let introspector = Introspector::new(&space);
        assert_eq!(introspector.public_methods(class).unwrap(), names(&["before"]));
    }

    space
        .define_method(class, "after", Visibility::Private, direct("c.rb", 1))
        .unwrap();
    space.remove_method(class, "before").unwrap();

    let introspector = Introspector::new(&space);
    assert!(introspector.public_methods(class).unwrap().is_empty());
    assert_eq!(introspector.private_methods(class).unwrap(), names(&["after"]));
}

#[test]
fn test_lookup_path_find() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let path = introspector.lookup_path(fixture.instance).unwrap();

    assert_eq!(path.subject(), Handle::Object(fixture.instance));
    assert_eq!(path.entries().len(), 8);
    assert_eq!(path.find("secret"), None);
    assert_eq!(path.find("missing"), None);

    let greet = path.find("greet").unwrap();
    assert_eq!(
        introspector.origin_of(greet).unwrap(),
        Origin::Resolved(SourceLocation::new("derived.rb", 8))
    );
    let helper = path.find("helper").unwrap();
    assert_eq!(
        introspector.origin_of(helper).unwrap().location(),
        Some(&SourceLocation::new("mod1.rb", 3))
    );
    assert!(path.entries()[4].is_overridden("greet"));
    assert!(path.entries()[4].is_overridden("secret"));
}

#[test]
fn test_wrong_kind_accessors_name_the_actual_type() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);

    assert_eq!(
        fixture.space.attached_object_of(fixture.derived),
        Err(InspectError::type_kind("singleton class", "Class"))
    );
    assert_eq!(
        introspector.display_name(Handle::Object(fixture.instance)),
        Err(InspectError::type_kind("module", "Derived"))
    );
}

#[test]
fn test_describe_modules_and_objects() {
    let fixture = mixin_hierarchy();
    let introspector = Introspector::new(&fixture.space);
    let greet = fixture.space.find_method(fixture.derived, "greet").unwrap();

    assert_eq!(introspector.describe(fixture.derived).unwrap(), "Derived");
    assert_eq!(
        introspector.describe(Handle::Object(fixture.instance)).unwrap(),
        "Derived instance"
    );
    assert_eq!(
        introspector.describe(greet),
        Err(InspectError::type_kind("module or object", "UnboundMethod"))
    );
}
