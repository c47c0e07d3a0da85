//! Locating the largest clade whose leaves share one feature value.

use crate::analysis::error::AnalysisError;
use crate::model::{AnnotationValue, GeneTree, VertexIndex};
use log::debug;

/// The clade chosen by [locate_clade].
///
/// `vertex` indexes the clade root in the tree it was located in and is only
/// valid until that tree is re-rooted.
#[derive(Debug, Clone, PartialEq)]
pub struct CladeRecord {
    pub vertex: VertexIndex,
    pub leaf_count: usize,
    pub tree_id: String,
    pub feature: String,
    pub value: AnnotationValue,
}

/// Finds the largest subtree whose leaves all share one value of `feature`.
///
/// Subtrees are visited in level order and a subtree is a candidate when
/// * it contains the leaf `must_include` (without one, any subtree qualifies),
/// * all its leaves carry the same value of `feature`,
/// * it has more than one leaf but fewer than the whole tree,
/// * its farthest leaf is at a non-zero distance.
///
/// The first candidate with the maximal leaf count wins. Its uniform value is
/// reported whatever `value` the caller expected; `value` is only logged.
///
/// # Errors
/// * [AnalysisError::LeafNotFound] if `must_include` is not a leaf of the tree
/// * [AnalysisError::MissingFeature] if a leaf has no value for `feature`
/// * [AnalysisError::CladeNotFound] if there is no candidate
///
/// # Example
/// ```
/// use cladenorm::analysis::locate_clade;
/// use cladenorm::newick::parse_str_with_annotations;
///
/// let tree = parse_str_with_annotations(
///     "(((a_H[&g=A],b_M[&g=A]),c_R[&g=A]),(d_Y[&g=B],e_P[&g=B]));",
/// ).unwrap();
/// let clade = locate_clade(&tree, "t1", "g", "A", None).unwrap();
///
/// assert_eq!(clade.leaf_count, 3);
/// ```
pub fn locate_clade(
    tree: &GeneTree,
    tree_id: &str,
    feature: &str,
    value: impl Into<AnnotationValue>,
    must_include: Option<&str>,
) -> Result<CladeRecord, AnalysisError> {
    let required = match must_include {
        Some(name) => Some(
            tree.find_leaf(name)
                .ok_or_else(|| AnalysisError::LeafNotFound(name.to_string()))?,
        ),
        None => None,
    };

    let leaf_values = leaf_values(tree, feature)?;
    let total_leaves = tree.num_leaves();
    let mut best: Option<(VertexIndex, usize, &AnnotationValue)> = None;

    for vertex in tree.level_order_iter() {
        let leaves = tree.leaves_of(vertex.index());
        let leaf_count = leaves.len();
        if leaf_count <= 1 || leaf_count >= total_leaves {
            continue;
        }
        if best.is_some_and(|(_, best_count, _)| leaf_count <= best_count) {
            continue;
        }
        if required.is_some_and(|leaf| !leaves.contains(&leaf)) {
            continue;
        }
        let Some(uniform) = uniform_value(&leaves, &leaf_values) else {
            continue;
        };
        if tree.farthest_leaf(vertex.index()).1 == 0.0 {
            continue;
        }
        best = Some((vertex.index(), leaf_count, uniform));
    }

    let (vertex, leaf_count, uniform) = best.ok_or_else(|| AnalysisError::CladeNotFound {
        tree_id: tree_id.to_string(),
        feature: feature.to_string(),
    })?;

    let expected = value.into();
    if &expected != uniform {
        debug!("Clade of {tree_id} has {feature}={uniform}, expected {expected}");
    }

    Ok(CladeRecord {
        vertex,
        leaf_count,
        tree_id: tree_id.to_string(),
        feature: feature.to_string(),
        value: uniform.clone(),
    })
}

/// Feature values indexed by vertex; `None` for non-leaves.
fn leaf_values<'a>(tree: &'a GeneTree, feature: &str) -> Result<Vec<Option<&'a AnnotationValue>>, AnalysisError> {
    let mut values = vec![None; tree.num_vertices()];
    for leaf in tree.leaf_indices() {
        let value = tree[leaf].feature(feature).ok_or_else(|| AnalysisError::MissingFeature {
            leaf: tree[leaf].label().unwrap_or_default().to_string(),
            feature: feature.to_string(),
        })?;
        values[leaf] = Some(value);
    }
    Ok(values)
}

fn uniform_value<'a>(leaves: &[VertexIndex], values: &[Option<&'a AnnotationValue>]) -> Option<&'a AnnotationValue> {
    let first = values[*leaves.first()?]?;
    leaves
        .iter()
        .all(|&leaf| values[leaf] == Some(first))
        .then_some(first)
}
