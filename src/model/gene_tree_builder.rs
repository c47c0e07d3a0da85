//! Provides the [TreeBuilder] implementation for [GeneTree].

use crate::model::annotation::AnnotationValue;
use crate::model::tree::{GeneTree, VertexIndex};
use crate::model::tree_builder::TreeBuilder;
use crate::model::vertex::{BranchLength, DEFAULT_BRANCH_LENGTH};
use log::debug;

/// Builder that constructs [GeneTree] instances.
///
/// Missing branch lengths become [DEFAULT_BRANCH_LENGTH]. Lengths must have
/// been checked by the parser already; anything negative or non-finite is
/// replaced by the default as well.
///
/// # Example
/// ```
/// use cladenorm::model::{GeneTreeBuilder, TreeBuilder};
///
/// let mut builder = GeneTreeBuilder::new();
/// builder.init_next(2);
/// let a = builder.add_leaf(Some(0.5), "a_HUMAN".to_string());
/// let b = builder.add_leaf(None, "b_MOUSE".to_string());
/// builder.add_root(vec![a, b], None);
/// let tree = builder.finish_tree().unwrap();
///
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree[b].dist(), 1.0);
/// ```
pub struct GeneTreeBuilder {
    current_tree: Option<GeneTree>,
}

impl GeneTreeBuilder {
    /// Creates a new builder in the empty state.
    pub fn new() -> Self {
        Self { current_tree: None }
    }

    fn tree(&mut self) -> &mut GeneTree {
        self.current_tree.get_or_insert_with(|| GeneTree::new(0))
    }
}

impl Default for GeneTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn to_branch_length(branch_len: Option<f64>) -> BranchLength {
    branch_len
        .and_then(BranchLength::try_new)
        .unwrap_or(DEFAULT_BRANCH_LENGTH)
}

impl TreeBuilder for GeneTreeBuilder {
    type VertexIdx = VertexIndex;
    type Tree = GeneTree;

    fn init_next(&mut self, num_leaves: usize) {
        self.current_tree = Some(GeneTree::new(num_leaves));
    }

    fn add_leaf(&mut self, branch_len: Option<f64>, label: String) -> Self::VertexIdx {
        self.tree().add_leaf(to_branch_length(branch_len), label)
    }

    fn add_internal(
        &mut self,
        children: Vec<Self::VertexIdx>,
        branch_len: Option<f64>,
        name: Option<String>,
    ) -> Self::VertexIdx {
        self.tree()
            .add_internal_vertex(children, to_branch_length(branch_len), name)
    }

    fn add_root(&mut self, children: Vec<Self::VertexIdx>, name: Option<String>) -> Self::VertexIdx {
        self.tree().add_root(children, name)
    }

    fn add_feature(&mut self, vertex: Self::VertexIdx, key: String, value: AnnotationValue) {
        if !self.tree()[vertex].set_feature(key.clone(), value) {
            debug!("Dropping annotation '{key}' on non-leaf vertex {vertex}");
        }
    }

    fn finish_tree(&mut self) -> Option<Self::Tree> {
        self.current_tree.take().filter(GeneTree::is_valid)
    }
}
