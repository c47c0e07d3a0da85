//! Gene tree data structures.
//!
//! Provides the arena-based [GeneTree] with its [Vertex] variants, typed
//! [AnnotationValue]s for leaf features, species tags of gene names and the
//! [TreeBuilder] used by the Newick parser.

pub mod annotation;
pub mod gene_tree_builder;
pub mod species;
pub mod tree;
pub mod tree_builder;
pub mod vertex;

pub use annotation::AnnotationValue;
pub use gene_tree_builder::GeneTreeBuilder;
pub use species::species_tag;
pub use tree::{GeneTree, VertexIndex};
pub use tree_builder::TreeBuilder;
pub use vertex::{BranchLength, DEFAULT_BRANCH_LENGTH, Event, Features, Vertex};
