use cladenorm::model::{BranchLength, GeneTree};
use cladenorm::newick::parse_str;

/// Builds `((A_h:1,B_m:1):1.5,C_h:0.5);`.
fn small_tree() -> (GeneTree, [usize; 5]) {
    let mut tree = GeneTree::new(3);
    let index_l1 = tree.add_leaf(BranchLength::new(1.0), "A_h".to_string());
    let index_l2 = tree.add_leaf(BranchLength::new(1.0), "B_m".to_string());
    let index_l3 = tree.add_leaf(BranchLength::new(0.5), "C_h".to_string());
    let index_i1 = tree.add_internal_vertex(vec![index_l1, index_l2], BranchLength::new(1.5), None);
    let index_root = tree.add_root(vec![index_i1, index_l3], None);
    (tree, [index_l1, index_l2, index_l3, index_i1, index_root])
}

#[test]
fn test_building_tree() {
    let (tree, [_, index_l2, _, index_i1, index_root]) = small_tree();
    assert!(tree.is_valid());

    // Counts
    assert_eq!(tree.num_leaves(), 3);
    assert_eq!(tree.num_internal(), 1);
    assert_eq!(tree.num_vertices(), 5);

    // Root
    let root = tree.root();
    assert_eq!(root.index(), index_root);
    assert!(root.is_root());

    // Leaf
    let l2 = &tree[index_l2];
    assert!(l2.is_leaf());
    assert_eq!(l2.index(), index_l2);
    assert_eq!(l2.label(), Some("B_m"));
    assert_eq!(l2.species(), Some("m"));
    assert_eq!(l2.parent_index(), Some(index_i1));

    // Internal
    let inti = &tree[index_i1];
    assert!(inti.is_internal());
    assert_eq!(inti.branch_length().unwrap(), BranchLength::new(1.5));
    assert_eq!(inti.parent_index(), Some(index_root));
}

#[test]
fn test_incomplete_tree_is_invalid() {
    let mut tree = GeneTree::new(2);
    let a = tree.add_leaf(BranchLength::new(1.0), "A".to_string());
    let _orphan = tree.add_leaf(BranchLength::new(1.0), "B".to_string());
    assert!(!tree.is_valid());
    tree.add_root(vec![a], None);
    // B is not reachable from the root
    assert!(!tree.is_valid());
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = GeneTree::new(2);
    tree.root(); // Should panic
}

#[test]
#[should_panic]
fn test_get_vertex_out_of_bounds() {
    let tree = GeneTree::new(2);
    let _ = &tree[55];
}

#[test]
fn test_distances_and_mrca() {
    let (tree, [a, b, c, ab, root]) = small_tree();
    assert_eq!(tree.mrca(a, b), ab);
    assert_eq!(tree.mrca(a, c), root);
    assert_eq!(tree.mrca(a, ab), ab);
    assert_eq!(tree.mrca(c, c), c);

    assert_eq!(tree.distance(a, b), 2.0);
    assert_eq!(tree.distance(a, c), 3.0);
    assert_eq!(tree.distance_to_root(a), 2.5);
    assert_eq!(tree.distance_to_root(root), 0.0);
    assert_eq!(tree.total_branch_length(), 4.0);
}

#[test]
fn test_farthest_leaf_prefers_first_on_tie() {
    let (tree, [a, _, _, _, root]) = small_tree();
    assert_eq!(tree.farthest_leaf(root), (a, 2.5));
}

#[test]
fn test_leaf_queries() {
    let (tree, [a, b, c, ab, root]) = small_tree();
    assert_eq!(tree.leaf_names(), vec!["A_h", "B_m", "C_h"]);
    assert_eq!(tree.leaves_of(ab), vec![a, b]);
    assert_eq!(tree.leaf_indices(), vec![a, b, c]);
    assert_eq!(tree.leaf_count_of(root), 3);
    assert_eq!(tree.leaf_counts()[ab], 2);
    assert_eq!(tree.find_leaf("C_h"), Some(c));
    assert_eq!(tree.find_leaf("D_h"), None);
    assert_eq!(tree.species().into_iter().collect::<Vec<_>>(), vec!["h", "m"]);
    assert_eq!(tree.ancestors(a).collect::<Vec<_>>(), vec![ab, root]);
}

#[test]
fn test_traversal_orders() {
    let tree = parse_str("((A,B)x,(C,D)y)r;").unwrap();
    let describe = |v: &cladenorm::model::Vertex| v.label().or(v.name()).unwrap_or("?").to_string();

    let pre: Vec<String> = tree.pre_order_iter().map(describe).collect();
    assert_eq!(pre, ["r", "x", "A", "B", "y", "C", "D"]);

    let post: Vec<String> = tree.post_order_iter().map(describe).collect();
    assert_eq!(post, ["A", "B", "x", "C", "D", "y", "r"]);

    let level: Vec<String> = tree.level_order_iter().map(describe).collect();
    assert_eq!(level, ["r", "x", "y", "A", "B", "C", "D"]);
}

#[test]
fn test_traversal_from_subtree() {
    let tree = parse_str("((A,B)x,(C,D)y)r;").unwrap();
    let y = tree.root().children()[1];
    let post: Vec<&str> = tree.post_order_iter_from(y).filter_map(|v| v.label()).collect();
    assert_eq!(post, ["C", "D"]);
}

#[test]
fn test_tree_name() {
    let (tree, _) = small_tree();
    let mut tree = tree.with_name("seed".to_string());
    assert_eq!(tree.name(), Some("seed"));
    tree.set_name(None);
    assert_eq!(tree.name(), None);
}
