//! Properties that hold for every well-formed object model

mod fixtures;

use std::collections::BTreeSet;

use fixtures::CountingModel;
use looksee_core::{
    AncestryWalker, HostModel, Introspector, MethodId, ModuleId, ObjectSpace, Representation,
    Visibility,
};
use proptest::prelude::*;
use proptest::sample::Index;

const METHOD_NAMES: [&str; 5] = ["each", "map", "to_s", "call", "hash"];

#[derive(Debug, Clone)]
enum Op {
    Define(Visibility, u32),
    Closure(u32),
    Native,
    Undef,
    Alias,
    Rewrap(Visibility),
    Bind,
}

fn visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Public),
        Just(Visibility::Protected),
        Just(Visibility::Private),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (visibility(), 0u32..500).prop_map(|(v, line)| Op::Define(v, line)),
        (0u32..500).prop_map(Op::Closure),
        Just(Op::Native),
        Just(Op::Undef),
        Just(Op::Alias),
        visibility().prop_map(Op::Rewrap),
        Just(Op::Bind),
    ]
}

/// Classes with optional parents among earlier classes, a few modules, and a
/// sequence of method operations. Operations the model rejects are skipped.
fn object_model() -> impl Strategy<Value = (ObjectSpace, Vec<ModuleId>)> {
    (
        prop::collection::vec(prop::option::of(any::<Index>()), 1..12),
        0usize..4,
        prop::collection::vec((any::<Index>(), any::<Index>()), 0..8),
        prop::collection::vec((any::<Index>(), any::<Index>(), op()), 0..40),
    )
        .prop_map(|(parents, module_count, includes, ops)| {
            let mut space = ObjectSpace::new();
            let mut classes: Vec<ModuleId> = Vec::new();
            for (i, parent) in parents.into_iter().enumerate() {
                let superclass = match parent {
                    Some(index) if !classes.is_empty() => Some(*index.get(&classes)),
                    _ => None,
                };
                let class = space.define_class(&format!("C{}", i), superclass).unwrap();
                classes.push(class);
            }
            let modules: Vec<ModuleId> = (0..module_count)
                .map(|i| space.define_module(&format!("M{}", i)).unwrap())
                .collect();
            if !modules.is_empty() {
                for (class, module) in includes {
                    let _ = space.include_module(*class.get(&classes), *module.get(&modules));
                }
            }

            let mut owners = classes.clone();
            owners.extend(&modules);
            for (owner, name, op) in ops {
                let owner = *owner.get(&owners);
                let name = *name.get(&METHOD_NAMES);
                let _ = match op {
                    Op::Define(visibility, line) => space.define_method(
                        owner,
                        name,
                        visibility,
                        Representation::Direct {
                            file: "prop.rb".to_string(),
                            line,
                        },
                    ),
                    Op::Closure(line) => space.define_method(
                        owner,
                        name,
                        Visibility::Public,
                        Representation::ClosureBacked {
                            file: "block.rb".to_string(),
                            line,
                        },
                    ),
                    Op::Native => {
                        space.define_method(owner, name, Visibility::Public, Representation::Opaque)
                    }
                    Op::Undef => space.undef_method(owner, name),
                    Op::Alias => space.alias_method(owner, &format!("{}_alias", name), name),
                    Op::Rewrap(visibility) => space.set_visibility(owner, name, visibility),
                    Op::Bind => match space.find_method(owner, name) {
                        Some(unbound) => space.bind_method(
                            owner,
                            &format!("{}_bound", name),
                            Visibility::Public,
                            unbound,
                        ),
                        None => continue,
                    },
                };
            }
            owners.extend(classes);
            (space, owners)
        })
}

fn all_methods(space: &ObjectSpace) -> Vec<MethodId> {
    (0u32..)
        .map(MethodId)
        .take_while(|id| space.contains((*id).into()))
        .collect()
}

proptest! {
    #[test]
    fn prop_ancestry_terminates_at_root((space, owners) in object_model()) {
        for &start in &owners {
            let counting = CountingModel::new(&space);
            let chain = AncestryWalker::default().walk(&counting, start).unwrap();
            prop_assert_eq!(chain.most_specific().module, start);
            prop_assert_eq!(space.superclass_of(chain.least_specific().module), None);
            prop_assert_eq!(chain.len(), counting.superclass_calls.get());
        }
    }

    #[test]
    fn prop_partition_is_exact_and_disjoint((space, owners) in object_model()) {
        let introspector = Introspector::new(&space);
        for &module in &owners {
            let public = introspector.public_methods(module).unwrap();
            let protected = introspector.protected_methods(module).unwrap();
            let private = introspector.private_methods(module).unwrap();
            let undefined = introspector.undefined_methods(module).unwrap();

            let sets = [&public, &protected, &private, &undefined];
            for (i, left) in sets.iter().enumerate() {
                for right in &sets[i + 1..] {
                    prop_assert!(left.is_disjoint(right));
                }
            }
            let union: BTreeSet<String> = sets.iter().flat_map(|set| set.iter().cloned()).collect();
            let table: BTreeSet<String> = space.own_method_table_of(module).into_keys().collect();
            prop_assert_eq!(union, table);
        }
    }

    #[test]
    fn prop_origin_is_idempotent((space, _owners) in object_model()) {
        let introspector = Introspector::new(&space);
        for method in all_methods(&space) {
            // Deep random chains may legitimately hit the depth cap; the
            // failure must then repeat too.
            let first = introspector.origin_of(method);
            let second = introspector.origin_of(method);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_alias_matches_target((space, _owners) in object_model()) {
        let introspector = Introspector::new(&space);
        for method in all_methods(&space) {
            let descriptor = space.method_descriptor(method).unwrap();
            if let Representation::Alias { target } = descriptor.representation {
                if let (Ok(alias), Ok(original)) =
                    (introspector.origin_of(method), introspector.origin_of(target))
                {
                    prop_assert_eq!(alias, original);
                }
            }
        }
    }
}
