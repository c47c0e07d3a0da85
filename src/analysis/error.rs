//! Error type of the tree analysis engine.

use thiserror::Error;

/// Errors raised by rooting, annotation, clade location and event counting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The tree has too few leaves for the requested operation
    #[error("Tree has {0} leaves, at least 2 are required")]
    TooFewLeaves(usize),

    /// The requested outgroup cannot be used for re-rooting
    #[error("Invalid outgroup: {0}")]
    InvalidOutgroup(String),

    /// Re-rooting merged branches into a length that is not finite
    #[error("Re-rooting produced branch length {0}")]
    InvalidBranchLength(f64),

    /// An internal vertex without event was reached during counting
    #[error("Vertex {0} has no event; classify events first")]
    Unclassified(usize),

    /// Species tags without a row in the annotation table
    #[error("No annotation row for species: {}", .0.join(", "))]
    UnmatchedSpecies(Vec<String>),

    /// A column requested from the annotation table does not exist
    #[error("Annotation table has no column '{0}'")]
    UnknownColumn(String),

    /// A leaf lacks the feature a clade search is based on
    #[error("Leaf '{leaf}' has no feature '{feature}'")]
    MissingFeature { leaf: String, feature: String },

    /// No subtree satisfies the clade conditions
    #[error("No clade with uniform '{feature}' found in tree '{tree_id}'")]
    CladeNotFound { tree_id: String, feature: String },

    /// Both leaves of a lineage query are the same
    #[error("Lineage events need two distinct leaves, got '{0}' twice")]
    SameLeaf(String),

    /// No leaf with the given name exists in the tree
    #[error("Leaf '{0}' not found in tree")]
    LeafNotFound(String),
}
