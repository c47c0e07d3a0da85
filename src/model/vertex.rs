//! Vertex module for gene tree representation.

use crate::model::annotation::AnnotationValue;
use crate::model::species::species_tag;
use crate::model::tree::VertexIndex;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

/// During construction, Internal and Leaf vertex might not have parent set yet.
const NO_PARENT_SET: VertexIndex = usize::MAX;

/// Named feature values attached to a leaf.
pub type Features = BTreeMap<String, AnnotationValue>;

// =#========================================================================#=
// EVENT
// =#========================================================================#=
/// Evolutionary event inferred at an internal vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Children carry disjoint species sets.
    Speciation,
    /// At least two children share a species.
    Duplication,
}

impl Event {
    /// Short code used in output records (`S` or `D`).
    pub fn code(&self) -> &'static str {
        match self {
            Event::Speciation => "S",
            Event::Duplication => "D",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a gene tree.
///
/// A vertex can be either:
/// - **Root**: Has children, no parent and no branch_length
/// - **Internal**: Has parent, children and branch_length
/// - **Leaf**: Has parent, branch_length, a gene name and optional features
///
/// Non-leaf vertices may carry a name (support values often end up there) and
/// an [Event] once events have been classified.
///
/// # Invariants
/// - `index` is index in arena
/// - `branch_length` is non-negative and finite
/// - Internal vertices and Leaf have `parent` set; `NO_PARENT_SET = usize::MAX` only during construction
/// - Root and Internal vertices have at least one child
#[derive(PartialEq, Debug, Clone)]
pub enum Vertex {
    /// Root vertex of the tree (has no parent)
    Root {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Indices of the child vertices, in input order
        children: Vec<VertexIndex>,
        /// Optional name of the vertex
        name: Option<String>,
        /// Event at this vertex, if classified
        event: Option<Event>,
    },
    /// Internal vertex (has parent and children)
    Internal {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Indices of the child vertices, in input order
        children: Vec<VertexIndex>,
        /// Distance to parent
        branch_length: BranchLength,
        /// Optional name of the vertex
        name: Option<String>,
        /// Event at this vertex, if classified
        event: Option<Event>,
    },
    /// Leaf vertex (a gene)
    Leaf {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Distance to parent
        branch_length: BranchLength,
        /// Gene name
        label: String,
        /// Per-leaf feature values
        features: Features,
    },
}

impl Vertex {
    /// Creates a new root vertex.
    pub fn new_root(index: VertexIndex, children: Vec<VertexIndex>, name: Option<String>) -> Self {
        Vertex::Root {
            index,
            children,
            name,
            event: None,
        }
    }

    /// Creates a new internal (non-leaf, non-root) vertex.
    pub fn new_internal(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: BranchLength,
        name: Option<String>,
    ) -> Self {
        Vertex::Internal {
            index,
            parent: NO_PARENT_SET,
            children,
            branch_length,
            name,
            event: None,
        }
    }

    /// Creates a new leaf vertex.
    pub fn new_leaf(index: VertexIndex, branch_length: BranchLength, label: String) -> Self {
        Vertex::Leaf {
            index,
            parent: NO_PARENT_SET,
            branch_length,
            label,
            features: Features::new(),
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        match self {
            Vertex::Root { index, .. } | Vertex::Internal { index, .. } | Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns the branch length if this is a non-root vertex, else `None`.
    pub fn branch_length(&self) -> Option<BranchLength> {
        match self {
            Vertex::Root { .. } => None,
            Vertex::Internal { branch_length, .. } | Vertex::Leaf { branch_length, .. } => Some(*branch_length),
        }
    }

    /// Returns the branch length as `f64`, with `0.0` for the root.
    pub fn dist(&self) -> f64 {
        self.branch_length().map_or(0.0, |bl| *bl)
    }

    /// Returns the gene name if this is a leaf, else `None`.
    pub fn label(&self) -> Option<&str> {
        match self {
            Vertex::Leaf { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Returns the species tag of the gene name if this is a leaf.
    pub fn species(&self) -> Option<&str> {
        self.label().map(species_tag)
    }

    /// Returns the name of a non-leaf vertex, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Vertex::Root { name, .. } | Vertex::Internal { name, .. } => name.as_deref(),
            Vertex::Leaf { .. } => None,
        }
    }

    /// Returns the classified event, if any.
    pub fn event(&self) -> Option<Event> {
        match self {
            Vertex::Root { event, .. } | Vertex::Internal { event, .. } => *event,
            Vertex::Leaf { .. } => None,
        }
    }

    /// Sets the event of a non-leaf vertex; ignored for leaves.
    pub fn set_event(&mut self, new_event: Option<Event>) {
        match self {
            Vertex::Root { event, .. } | Vertex::Internal { event, .. } => *event = new_event,
            Vertex::Leaf { .. } => {}
        }
    }

    /// Returns the features of a leaf, else `None`.
    pub fn features(&self) -> Option<&Features> {
        match self {
            Vertex::Leaf { features, .. } => Some(features),
            _ => None,
        }
    }

    /// Returns a single feature value of a leaf.
    pub fn feature(&self, key: &str) -> Option<&AnnotationValue> {
        self.features().and_then(|f| f.get(key))
    }

    /// Sets a feature value on a leaf.
    ///
    /// # Returns
    /// `false` if this vertex is not a leaf and nothing was stored.
    pub fn set_feature(&mut self, key: String, value: AnnotationValue) -> bool {
        match self {
            Vertex::Leaf { features, .. } => {
                features.insert(key, value);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex.
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex is a root.
    pub fn is_root(&self) -> bool {
        matches!(self, Vertex::Root { .. })
    }

    /// Returns the children, empty for a leaf.
    pub fn children(&self) -> &[VertexIndex] {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => children,
            Vertex::Leaf { .. } => &[],
        }
    }

    /// Sets new parent for non-root vertex.
    ///
    /// # Panics
    /// Panics if called on root.
    pub fn set_parent(&mut self, parent: VertexIndex) {
        match self {
            Vertex::Root { .. } => panic!("Cannot set parent on root vertex"),
            Vertex::Internal { parent: p, .. } | Vertex::Leaf { parent: p, .. } => *p = parent,
        }
    }

    /// Returns the index of parent if this a non-root vertex, else `None`.
    ///
    /// Note that parent might not be set yet during construction.
    pub fn parent_index(&self) -> Option<VertexIndex> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => {
                if *parent == NO_PARENT_SET { None } else { Some(*parent) }
            }
            Vertex::Root { .. } => None,
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a gene tree, enforced non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BranchLength(f64);

/// Length assigned to a branch whose length is not given.
pub const DEFAULT_BRANCH_LENGTH: BranchLength = BranchLength(1.0);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        Self::try_new(length).unwrap_or_else(|| panic!("Branch length must be non-negative and finite, got {length}"))
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
