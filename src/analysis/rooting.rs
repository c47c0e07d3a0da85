//! Outgroup selection and re-rooting.
//!
//! Re-rooting rebuilds the arena: the tree is viewed as undirected, the new
//! root is placed on the branch above the outgroup and every vertex is
//! re-oriented away from it. Vertex indices are therefore invalidated by
//! [set_outgroup].

use crate::analysis::error::AnalysisError;
use crate::model::{BranchLength, GeneTree, Vertex, VertexIndex};
use log::debug;
use std::collections::HashMap;

/// Age rank per species tag, higher is older.
pub type SpeciesAges = HashMap<String, i64>;

/// Undirected adjacency: `(neighbour, length of the connecting branch)`.
type Adjacency = Vec<Vec<(VertexIndex, f64)>>;

// =#========================================================================#=
// OUTGROUP SELECTION
// =#========================================================================#=
/// Roots the tree at the leaf of the oldest species and returns its name.
///
/// Among the species present in the tree and known to `ages`, the maximum
/// age is taken; every leaf whose species attains it is eligible, and the
/// one farthest from the current root wins (ties: first in pre-order). If no
/// species is known, the leaf farthest from the root is used.
///
/// # Errors
/// [AnalysisError::TooFewLeaves] if the tree has fewer than two leaves.
///
/// # Example
/// ```
/// use cladenorm::analysis::{SpeciesAges, root_by_age};
/// use cladenorm::newick::parse_str;
///
/// let mut tree = parse_str("((A_sp1,B_sp2),(C_sp3,D_sp4));").unwrap();
/// let ages = SpeciesAges::from([("sp1".to_string(), 2), ("sp2".to_string(), 1)]);
///
/// assert_eq!(root_by_age(&mut tree, &ages).unwrap(), "A_sp1");
/// ```
pub fn root_by_age(tree: &mut GeneTree, ages: &SpeciesAges) -> Result<String, AnalysisError> {
    let num_leaves = tree.num_leaves();
    if num_leaves < 2 {
        return Err(AnalysisError::TooFewLeaves(num_leaves));
    }

    let max_age = tree.species().into_iter().filter_map(|sp| ages.get(sp)).max().copied();
    let root = tree.root_index();

    let outgroup = match max_age {
        Some(max_age) => tree
            .leaf_distances_from(root)
            .into_iter()
            .filter(|&(leaf, _)| tree[leaf].species().and_then(|sp| ages.get(sp)) == Some(&max_age))
            .fold(None, |best: Option<(VertexIndex, f64)>, (leaf, dist)| match best {
                Some((_, best_dist)) if best_dist >= dist => best,
                _ => Some((leaf, dist)),
            })
            .map(|(leaf, _)| leaf)
            .unwrap_or(root),
        None => {
            debug!("No species of the tree has a known age, using farthest leaf");
            tree.farthest_leaf(root).0
        }
    };

    let name = tree[outgroup].label().unwrap_or_default().to_string();
    debug!("Outgroup {name} (max age {max_age:?})");
    set_outgroup(tree, outgroup)?;

    Ok(name)
}

/// Returns the outgroup that roots the tree at the midpoint of its longest leaf-to-leaf path.
///
/// `A` is the leaf farthest from the root and `B` the leaf farthest from `A`.
/// Walking up from `A` and summing branch lengths, the first vertex whose
/// cumulative length exceeds half of `d(A, B)` is returned. A walk that
/// reaches the root stops at the root's child on the path.
///
/// # Errors
/// [AnalysisError::TooFewLeaves] if the tree has fewer than two leaves.
pub fn midpoint_outgroup(tree: &GeneTree) -> Result<VertexIndex, AnalysisError> {
    let num_leaves = tree.num_leaves();
    if num_leaves < 2 {
        return Err(AnalysisError::TooFewLeaves(num_leaves));
    }

    let (a, _) = tree.farthest_leaf(tree.root_index());
    let (b, diameter) = tree
        .leaf_indices()
        .into_iter()
        .map(|leaf| (leaf, tree.distance(a, leaf)))
        .fold((a, 0.0), |best, (leaf, dist)| if dist > best.1 { (leaf, dist) } else { best });
    let half = diameter / 2.0;
    debug!("Midpoint between vertices {a} and {b}, diameter {diameter}");

    let mut walked = 0.0;
    let mut current = a;
    loop {
        walked += tree[current].dist();
        if walked > half {
            return Ok(current);
        }
        match tree[current].parent_index() {
            Some(parent) if !tree[parent].is_root() => current = parent,
            _ => return Ok(current),
        }
    }
}

/// Re-roots the tree at its midpoint and returns the new root index.
pub fn root_at_midpoint(tree: &mut GeneTree) -> Result<VertexIndex, AnalysisError> {
    let outgroup = midpoint_outgroup(tree)?;
    set_outgroup(tree, outgroup)?;
    Ok(tree.root_index())
}

// =#========================================================================#=
// RE-ROOTING
// =#========================================================================#=
/// Re-roots the tree on the branch above `outgroup`.
///
/// The new root has the two children `[outgroup, rest]`, each getting half of
/// the branch that connected them. A former root with two children is
/// suppressed and its branches merged; one with more children stays as an
/// internal vertex. Events are cleared. Applying the same outgroup twice
/// yields the same tree.
///
/// # Errors
/// * [AnalysisError::InvalidOutgroup] if `outgroup` is the root or not a vertex of the tree.
/// * [AnalysisError::InvalidBranchLength] if merging the branches of a
///   suppressed root overflows. The tree is left unchanged.
pub fn set_outgroup(tree: &mut GeneTree, outgroup: VertexIndex) -> Result<(), AnalysisError> {
    if outgroup >= tree.num_vertices() {
        return Err(AnalysisError::InvalidOutgroup(format!("vertex {outgroup} does not exist")));
    }
    if tree[outgroup].is_root() {
        return Err(AnalysisError::InvalidOutgroup("cannot root on the current root".to_string()));
    }
    if tree.root().children().len() == 1 && tree[outgroup].parent_index() == Some(tree.root_index()) {
        return Err(AnalysisError::InvalidOutgroup("outgroup already spans the whole tree".to_string()));
    }

    let neighbours = unrooted_adjacency(tree);

    // The parent entry is always last; it may have been replaced by a sibling
    let Some(&(rest, length)) = neighbours[outgroup].last() else {
        return Err(AnalysisError::InvalidOutgroup(format!("vertex {outgroup} is isolated")));
    };

    let mut rerooted = GeneTree::new(tree.num_leaves());
    rerooted.set_name(tree.name().map(str::to_string));
    let half = branch_length(length / 2.0)?;
    let first = copy_oriented(tree, &neighbours, &mut rerooted, outgroup, rest, half)?;
    let second = copy_oriented(tree, &neighbours, &mut rerooted, rest, outgroup, half)?;
    rerooted.add_root(vec![first, second], None);

    *tree = rerooted;
    Ok(())
}

/// Builds the undirected view of the tree with the root suppressed if it has degree two.
///
/// Each list holds the children in order, followed by the parent.
fn unrooted_adjacency(tree: &GeneTree) -> Adjacency {
    let mut neighbours: Adjacency = vec![Vec::new(); tree.num_vertices()];
    for vertex in tree.pre_order_iter() {
        let index = vertex.index();
        for &child in vertex.children() {
            neighbours[index].push((child, tree[child].dist()));
        }
        if let Some(parent) = vertex.parent_index() {
            neighbours[index].push((parent, vertex.dist()));
        }
    }

    let root = tree.root_index();
    match tree.root().children() {
        &[left, right] => {
            let merged = tree[left].dist() + tree[right].dist();
            replace_neighbour(&mut neighbours[left], root, right, merged);
            replace_neighbour(&mut neighbours[right], root, left, merged);
            neighbours[root].clear();
        }
        &[only] => {
            neighbours[only].retain(|&(n, _)| n != root);
            neighbours[root].clear();
        }
        _ => {}
    }

    neighbours
}

fn branch_length(length: f64) -> Result<BranchLength, AnalysisError> {
    BranchLength::try_new(length).ok_or(AnalysisError::InvalidBranchLength(length))
}

fn replace_neighbour(list: &mut [(VertexIndex, f64)], old: VertexIndex, new: VertexIndex, length: f64) {
    for entry in list.iter_mut().filter(|(n, _)| *n == old) {
        *entry = (new, length);
    }
}

/// Copies the component of `start` that does not contain `from` into `target`,
/// oriented away from `from`, and returns the new index of `start`.
fn copy_oriented(
    source: &GeneTree,
    neighbours: &Adjacency,
    target: &mut GeneTree,
    start: VertexIndex,
    from: VertexIndex,
    start_length: BranchLength,
) -> Result<VertexIndex, AnalysisError> {
    // (old index, came from, branch length, children visited)
    let mut stack = vec![(start, from, start_length, false)];
    // New indices of finished children, per open vertex on the stack
    let mut finished: Vec<Vec<VertexIndex>> = vec![Vec::new()];
    let mut last = 0;

    while let Some((old, came_from, length, visited)) = stack.pop() {
        let next: Vec<(VertexIndex, f64)> = neighbours[old]
            .iter()
            .copied()
            .filter(|&(n, _)| n != came_from)
            .collect();

        if !visited && !next.is_empty() {
            stack.push((old, came_from, length, true));
            finished.push(Vec::new());
            for &(child, child_length) in next.iter().rev() {
                stack.push((child, old, branch_length(child_length)?, false));
            }
            continue;
        }

        let new_index = match &source[old] {
            Vertex::Leaf { label, features, .. } => {
                let index = target.add_leaf(length, label.clone());
                for (key, value) in features {
                    target[index].set_feature(key.clone(), value.clone());
                }
                index
            }
            vertex => {
                let children = if visited { finished.pop().unwrap_or_default() } else { Vec::new() };
                target.add_internal_vertex(children, length, vertex.name().map(str::to_string))
            }
        };
        if let Some(parent_children) = finished.last_mut() {
            parent_children.push(new_index);
        }
        last = new_index;
    }

    Ok(last)
}
