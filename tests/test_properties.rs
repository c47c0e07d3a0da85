use cladenorm::analysis::{
    FeatureTable, SpeciesAges, annotate, branch_stats, classify_events, count_events, lineage_events, locate_clade,
    root_at_midpoint, root_by_age,
};
use cladenorm::model::GeneTree;
use cladenorm::newick::parse_str;
use proptest::prelude::*;

/// Builds a binary Newick tree by repeatedly joining two neighbouring subtrees.
fn binary_newick(species: &[u8], joins: &[usize], lengths: &[f64]) -> String {
    let length = |i: usize| lengths[i % lengths.len()];
    let mut items: Vec<String> = species
        .iter()
        .enumerate()
        .map(|(i, sp)| format!("g{i}_sp{sp}:{}", length(i)))
        .collect();

    let mut step = 0;
    while items.len() > 2 {
        let k = joins[step % joins.len()] % (items.len() - 1);
        let right = items.remove(k + 1);
        let left = std::mem::take(&mut items[k]);
        items[k] = format!("({left},{right}):{}", length(species.len() + step));
        step += 1;
    }
    format!("({});", items.join(","))
}

fn arb_tree() -> impl Strategy<Value = GeneTree> {
    (
        prop::collection::vec(0u8..6, 2..16),
        prop::collection::vec(any::<usize>(), 1..16),
        prop::collection::vec(0.01f64..5.0, 1..32),
    )
        .prop_map(|(species, joins, lengths)| parse_str(binary_newick(&species, &joins, &lengths)).unwrap())
}

fn parity_table() -> FeatureTable {
    FeatureTable::new(
        vec!["Proteome".into(), "Parity".into()],
        (0..6)
            .map(|sp| vec![format!("sp{sp}"), if sp % 2 == 0 { "even" } else { "odd" }.to_string()])
            .collect(),
    )
}

/// Leaf counts of all subtrees with more than one but not all leaves, one
/// parity value and a non-zero width.
fn candidate_sizes(tree: &GeneTree) -> impl Iterator<Item = usize> + '_ {
    tree.level_order_iter().filter_map(move |vertex| {
        let leaves = tree.leaves_of(vertex.index());
        let first = tree[*leaves.first()?].feature("Parity");
        let proper = leaves.len() > 1 && leaves.len() < tree.num_leaves();
        let uniform = leaves.iter().all(|&leaf| tree[leaf].feature("Parity") == first);
        (proper && uniform && branch_stats(tree, vertex.index()).width > 0.0).then_some(leaves.len())
    })
}

proptest! {
    #[test]
    fn generated_trees_are_valid(tree in arb_tree()) {
        prop_assert!(tree.is_valid());
        // Root plus non-root internal vertices of a binary tree
        prop_assert_eq!(tree.num_internal() + 1, tree.num_leaves() - 1);
    }

    #[test]
    fn whole_tree_stats_cover_all_leaves(tree in arb_tree()) {
        let root = tree.root_index();
        let stats = branch_stats(&tree, root);
        let expected_sum: f64 = tree.leaf_indices().iter().map(|&l| tree.distance_to_root(l)).sum();

        prop_assert_eq!(stats.leafno, tree.num_leaves());
        prop_assert!((stats.sum - expected_sum).abs() < 1e-9);
        prop_assert!(stats.width >= stats.median);
        prop_assert!(stats.width >= stats.mean - 1e-9);
    }

    #[test]
    fn binary_trees_have_one_event_per_split(mut tree in arb_tree()) {
        classify_events(&mut tree);
        let counts = count_events(&tree, tree.root_index()).unwrap();
        prop_assert_eq!(counts.total(), tree.num_leaves() - 1);
    }

    #[test]
    fn lineage_events_are_symmetric(mut tree in arb_tree(), i in any::<usize>(), j in any::<usize>()) {
        classify_events(&mut tree);
        let names = tree.leaf_names();
        let a = names[i % names.len()];
        let b = names[j % names.len()];
        prop_assume!(a != b);

        let forward = lineage_events(&tree, a, b).unwrap();
        let backward = lineage_events(&tree, b, a).unwrap();
        prop_assert_eq!(forward, backward);
        prop_assert_eq!(tree[tree.mrca(tree.find_leaf(a).unwrap(), tree.find_leaf(b).unwrap())].event(), Some(forward.mrca));
    }

    #[test]
    fn located_clades_are_largest_uniform_proper_subtrees(mut tree in arb_tree()) {
        annotate(&mut tree, &parity_table(), "Proteome", "Parity").unwrap();
        let largest_candidate = candidate_sizes(&tree).max();

        match locate_clade(&tree, "prop", "Parity", "even", None) {
            Ok(clade) => {
                let leaves = tree.leaves_of(clade.vertex);
                prop_assert!(leaves.len() > 1);
                prop_assert!(leaves.len() < tree.num_leaves());
                prop_assert_eq!(leaves.len(), clade.leaf_count);
                prop_assert!(branch_stats(&tree, clade.vertex).width > 0.0);
                for leaf in leaves {
                    prop_assert_eq!(tree[leaf].feature("Parity"), Some(&clade.value));
                }
                prop_assert_eq!(largest_candidate, Some(clade.leaf_count));
            }
            Err(_) => {
                prop_assert_eq!(largest_candidate, None);
            }
        }
    }

    #[test]
    fn rerooting_keeps_leaf_distances(tree in arb_tree(), oldest in 0u8..6) {
        let ages = SpeciesAges::from([(format!("sp{oldest}"), 1)]);
        let mut by_age = tree.clone();
        root_by_age(&mut by_age, &ages).unwrap();
        let mut midpoint = tree.clone();
        root_at_midpoint(&mut midpoint).unwrap();

        for rerooted in [&by_age, &midpoint] {
            prop_assert!(rerooted.is_valid());
            prop_assert_eq!(rerooted.num_leaves(), tree.num_leaves());
            let names = tree.leaf_names();
            for (k, a) in names.iter().enumerate() {
                for b in &names[k + 1..] {
                    let before = tree.distance(tree.find_leaf(a).unwrap(), tree.find_leaf(b).unwrap());
                    let after = rerooted.distance(rerooted.find_leaf(a).unwrap(), rerooted.find_leaf(b).unwrap());
                    prop_assert!((before - after).abs() < 1e-9);
                }
            }
        }
    }
}
