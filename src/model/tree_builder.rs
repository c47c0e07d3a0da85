//! Trait for constructing gene trees during parsing.
//!
//! The [`TreeBuilder`] trait decouples the Newick parser from the concrete
//! tree representation. The parser calls builder methods as it reads the
//! Newick syntax, and the builder assembles whatever tree structure it wants.
//!
//! # Builder lifecycle
//! A builder can construct multiple trees sequentially:
//!
//! ```text
//! Empty ──→ init_next() ──→ Building ──→ add_* ──→ finish_tree() ──→ Empty
//!   ↑                                                                  │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate ships [GeneTreeBuilder](crate::model::GeneTreeBuilder), which
//! builds [GeneTree](crate::model::GeneTree) values.

use crate::model::annotation::AnnotationValue;

// =#========================================================================#=
// TREE BUILDER (trait)
// =#========================================================================#=
/// Abstraction for constructing trees during parsing.
///
/// The parser drives the lifecycle:
///
/// 1. [`init_next`](Self::init_next) -> prepare for a new tree
/// 2. [`add_leaf`](Self::add_leaf), [`add_internal`](Self::add_internal),
///    [`add_root`](Self::add_root), [`add_feature`](Self::add_feature) -> build structure
/// 3. [`finish_tree`](Self::finish_tree) -> finalize and return the tree
pub trait TreeBuilder {
    /// The type used to identify vertices during construction.
    ///
    /// Returned by the `add_*` methods, then passed to subsequent calls to
    /// connect parent-child relationships.
    type VertexIdx: Copy;

    /// The tree type produced by this builder.
    type Tree;

    /// Prepares the builder for constructing a new tree.
    ///
    /// # Arguments
    /// * `num_leaves`: Expected number of leaves (hint for allocation)
    fn init_next(&mut self, num_leaves: usize);

    /// Adds a leaf vertex to the tree under construction.
    ///
    /// # Arguments
    /// * `branch_len`: Branch length to parent, if specified in the Newick
    /// * `label`: Gene name of the leaf
    fn add_leaf(&mut self, branch_len: Option<f64>, label: String) -> Self::VertexIdx;

    /// Adds an internal (non-root) vertex with one or more children.
    ///
    /// # Arguments
    /// * `children`: Indices of the child vertices, in input order
    /// * `branch_len`: Branch length to parent, if specified
    /// * `name`: Label following the closing parenthesis, if any
    fn add_internal(
        &mut self,
        children: Vec<Self::VertexIdx>,
        branch_len: Option<f64>,
        name: Option<String>,
    ) -> Self::VertexIdx;

    /// Adds the root vertex, completing the tree structure.
    fn add_root(&mut self, children: Vec<Self::VertexIdx>, name: Option<String>) -> Self::VertexIdx;

    /// Attaches an annotation parsed from a `[&key=value]` block to a vertex.
    fn add_feature(&mut self, vertex: Self::VertexIdx, key: String, value: AnnotationValue);

    /// Finalizes the building process and returns the resulting tree, or
    /// `None` if no complete tree was built.
    ///
    /// Leaves the builder in the empty state.
    fn finish_tree(&mut self) -> Option<Self::Tree>;
}
