#![allow(unused)]

use cladenorm::model::{AnnotationValue, BranchLength, DEFAULT_BRANCH_LENGTH, Event, Vertex};

// ============= Branch Length Tests =============
#[test]
fn test_branch_lengths() {
    let test_length = 1.234;
    let vertex = Vertex::new_internal(5, vec![1, 2], BranchLength::new(test_length), None);
    assert_eq!(*vertex.branch_length().unwrap(), test_length);
    assert_eq!(vertex.dist(), test_length);
}

#[test]
#[should_panic]
fn test_negative_branch_length() {
    let negative_length = BranchLength::new(-1.0);
}

#[test]
fn test_try_new_rejects_invalid_lengths() {
    assert!(BranchLength::try_new(-0.1).is_none());
    assert!(BranchLength::try_new(f64::NAN).is_none());
    assert!(BranchLength::try_new(f64::INFINITY).is_none());
    assert_eq!(BranchLength::try_new(0.0), Some(BranchLength::new(0.0)));
    assert_eq!(*DEFAULT_BRANCH_LENGTH, 1.0);
}

// ============= Vertex Variant Consistency Tests =============
#[test]
fn test_is_x() {
    let leaf = Vertex::new_leaf(0, BranchLength::new(0.5), "g1_HUMAN".to_string());
    assert!(leaf.is_leaf());

    let vertex = Vertex::new_internal(0, vec![1, 2], BranchLength::new(0.5), None);
    assert!(vertex.is_internal());

    let root = Vertex::new_root(2, vec![42, 43], None);
    assert!(root.is_root());
    assert_eq!(root.branch_length(), None);
    assert_eq!(root.dist(), 0.0);
}

#[test]
fn test_nonleaf_vertex_has_no_label() {
    let internal = Vertex::new_internal(0, vec![1, 2], BranchLength::new(0.5), Some("0.98".to_string()));
    assert_eq!(internal.label(), None);
    assert_eq!(internal.name(), Some("0.98"));
    assert_eq!(internal.species(), None);

    let root = Vertex::new_root(0, vec![12, 34], None);
    assert_eq!(root.label(), None);
    assert_eq!(root.name(), None);
}

#[test]
fn test_parent_unset() {
    let vertex = Vertex::new_internal(0, vec![1, 2], BranchLength::new(0.5), None);
    assert_eq!(vertex.parent_index(), None);

    let mut leaf = Vertex::new_leaf(0, BranchLength::new(0.5), "a".to_string());
    assert_eq!(leaf.parent_index(), None);
    leaf.set_parent(7);
    assert_eq!(leaf.parent_index(), Some(7));

    let root = Vertex::new_root(2, vec![42, 43], None);
    assert_eq!(root.parent_index(), None);
}

#[test]
#[should_panic]
fn test_root_has_no_parent_to_set() {
    let mut root = Vertex::new_root(0, vec![1], None);
    root.set_parent(3);
}

#[test]
fn test_leaf_has_no_children() {
    let vertex = Vertex::new_leaf(0, BranchLength::new(0.5), "a".to_string());
    assert!(vertex.children().is_empty());
}

// ============= Events and Features =============
#[test]
fn test_events_only_on_nonleaf() {
    let mut internal = Vertex::new_internal(0, vec![1, 2], BranchLength::new(0.5), None);
    internal.set_event(Some(Event::Duplication));
    assert_eq!(internal.event(), Some(Event::Duplication));
    assert_eq!(Event::Duplication.to_string(), "D");
    assert_eq!(Event::Speciation.code(), "S");

    let mut leaf = Vertex::new_leaf(0, BranchLength::new(0.5), "a".to_string());
    leaf.set_event(Some(Event::Speciation));
    assert_eq!(leaf.event(), None);
}

#[test]
fn test_features_only_on_leaf() {
    let mut leaf = Vertex::new_leaf(0, BranchLength::new(0.5), "g_MOUSE".to_string());
    assert_eq!(leaf.species(), Some("MOUSE"));
    assert!(leaf.set_feature("group".to_string(), AnnotationValue::from("A")));
    assert_eq!(leaf.feature("group"), Some(&AnnotationValue::from("A")));
    assert_eq!(leaf.features().map(|f| f.len()), Some(1));

    let mut root = Vertex::new_root(0, vec![1], None);
    assert!(!root.set_feature("group".to_string(), AnnotationValue::from("A")));
    assert!(root.features().is_none());
}
