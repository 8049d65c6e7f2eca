#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::ErrorCategory;
use pretty_assertions::assert_eq;

#[test]
fn test_constructors_sorted_lexicographically() {
    let interner = StringInterner::new();
    let mut registry = DataTypeRegistry::new();
    let tree = registry
        .register(
            &interner,
            "Tree",
            &[("Node", &["left", "x", "right"]), ("Empty", &[])],
        )
        .unwrap();

    let names: Vec<_> = registry
        .datatype(tree)
        .ctrs
        .iter()
        .map(|&c| interner.lookup(c))
        .collect();
    assert_eq!(names, vec!["Empty", "Node"]);
    assert_eq!(registry.slot_of(interner.intern("Empty")), Some(0));
    assert_eq!(registry.slot_of(interner.intern("Node")), Some(1));
}

#[test]
fn test_fields_keep_declaration_order() {
    let interner = StringInterner::new();
    let mut registry = DataTypeRegistry::new();
    registry
        .register(&interner, "Tree", &[("Node", &["left", "x", "right"])])
        .unwrap();
    let node = registry.ctr(interner.intern("Node")).unwrap();
    let fields: Vec<_> = node.fields.iter().map(|&f| interner.lookup(f)).collect();
    assert_eq!(fields, vec!["left", "x", "right"]);
    assert_eq!(registry.arity(interner.intern("Node")), Some(3));
}

#[test]
fn test_prelude() {
    let interner = StringInterner::new();
    let registry = DataTypeRegistry::with_prelude(&interner);
    assert_eq!(registry.len(), 5);

    let cons = interner.intern("Cons");
    let nil = interner.intern("Nil");
    assert_eq!(registry.datatype_of(cons), registry.datatype_of(nil));
    assert_eq!(registry.arity(cons), Some(2));
    assert_eq!(registry.slot_of(cons), Some(0));

    let ordering = registry.datatype_of(interner.intern("LT")).unwrap();
    let names: Vec<_> = registry
        .datatype(ordering)
        .ctrs
        .iter()
        .map(|&c| interner.lookup(c))
        .collect();
    assert_eq!(names, vec!["EQ", "GT", "LT"]);
}

#[test]
fn test_unknown_constructor() {
    let interner = StringInterner::new();
    let registry = DataTypeRegistry::with_prelude(&interner);
    assert_eq!(registry.ctr(interner.intern("Leaf")), None);
}

#[test]
fn test_duplicate_constructor_rejected() {
    let interner = StringInterner::new();
    let mut registry = DataTypeRegistry::with_prelude(&interner);

    let err = registry
        .register(&interner, "Maybe", &[("Nothing", &[]), ("Some", &["x"])])
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Invariant);

    let err = registry
        .register(&interner, "Twice", &[("A", &[]), ("A", &[])])
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Invariant);
    assert_eq!(registry.len(), 5);
}
