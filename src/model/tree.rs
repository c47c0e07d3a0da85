//! Tree module for gene tree representation.
//!
//! This module provides the core data structures for representing gene trees:
//! - `GeneTree`: The main tree structure using the arena pattern for efficient memory layout.
//! - `VertexIndex` is used to index vertices.
//! - Pre-order, post-order and level-order iterators, rooted at any vertex.

use crate::model::vertex::{BranchLength, Vertex};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// GENE TREE
// =#========================================================================#=
/// A rooted, possibly multifurcating gene tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by [VertexIndex].
/// Indices are only stable until the tree is re-rooted, which rebuilds the arena.
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena
/// - Index of root is maintained
/// - No assumption on order of indices is maintained
/// - Children keep their input order, which defines all traversal orders
///
/// # Construction
/// Add vertices bottom-up; adding a parent sets the parent index of its children.
/// Test validity with [GeneTree::is_valid].
///
/// # Example
/// ```
/// use cladenorm::model::{BranchLength, GeneTree};
///
/// // ((A_h:0.2,B_m:0.2):0.2,C_h:0.4);
/// let mut tree = GeneTree::new(3);
/// let a = tree.add_leaf(BranchLength::new(0.2), "A_h".to_string());
/// let b = tree.add_leaf(BranchLength::new(0.2), "B_m".to_string());
/// let c = tree.add_leaf(BranchLength::new(0.4), "C_h".to_string());
/// let ab = tree.add_internal_vertex(vec![a, b], BranchLength::new(0.2), None);
/// tree.add_root(vec![ab, c], None);
///
/// assert!(tree.is_valid());
/// assert!((tree.distance(a, c) - 0.8).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GeneTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,

    /// Name of tree; optional, usually the seed gene of a batch record
    name: Option<String>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl GeneTree {
    /// Creates a new tree with capacity for a binary tree with `num_leaves` leaves.
    pub fn new(num_leaves: usize) -> Self {
        GeneTree {
            vertices: Vec::with_capacity(2 * num_leaves.max(1)),
            root_index: NO_ROOT_SET_INDEX,
            name: None,
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets or clears the name of this tree.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Adds a root to the tree, assigning a unique index, which gets returned.
    pub fn add_root(&mut self, children: Vec<VertexIndex>, name: Option<String>) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices.push(Vertex::new_root(index, children, name));
        self.root_index = index;

        index
    }

    /// Adds an internal vertex to the tree, assigning a unique index, which gets returned.
    pub fn add_internal_vertex(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: BranchLength,
        name: Option<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self[child].set_parent(index);
        }
        self.vertices.push(Vertex::new_internal(index, children, branch_length, name));

        index
    }

    /// Adds a leaf to the tree, assigning a unique index, which gets returned.
    pub fn add_leaf(&mut self, branch_length: BranchLength, label: String) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_leaf(index, branch_length, label));
        index
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and points to the only Root vertex
    /// - All vertex indices match their position in the arena
    /// - Non-leaf vertices have children, which point back to them as parent
    /// - All non-root vertices have a parent listing them as a child
    /// - Every vertex is reachable from the root
    pub fn is_valid(&self) -> bool {
        if self.root_index >= self.vertices.len() || !self.vertices[self.root_index].is_root() {
            return false;
        }

        let mut found_root = false;
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }

            if vertex.is_root() {
                if found_root {
                    return false;
                }
                found_root = true;
            }

            if !vertex.is_leaf() && vertex.children().is_empty() {
                return false;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() || self.vertices[child].parent_index() != Some(index) {
                    return false;
                }
            }

            if !vertex.is_root() {
                match vertex.parent_index() {
                    Some(parent) if parent < self.vertices.len() => {
                        if !self.vertices[parent].children().contains(&index) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }

        self.pre_order_iter().count() == self.vertices.len()
    }

    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns the index of the root vertex.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus tree hasn't been fully constructed yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns a reference to the vertex at the given index.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns a mutable reference to the vertex at the given index.
    pub fn vertex_mut(&mut self, index: VertexIndex) -> &mut Vertex {
        &mut self.vertices[index]
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices in this tree.
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the sum of all branch lengths in the tree.
    pub fn total_branch_length(&self) -> f64 {
        self.vertices.iter().map(Vertex::dist).sum()
    }
}

impl std::ops::Index<VertexIndex> for GeneTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<VertexIndex> for GeneTree {
    fn index_mut(&mut self, index: VertexIndex) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// ============================================================================
// Leaves, ancestry and distances (pub)
// ============================================================================
impl GeneTree {
    /// Returns the leaf indices below `vertex` in pre-order.
    pub fn leaves_of(&self, vertex: VertexIndex) -> Vec<VertexIndex> {
        self.pre_order_iter_from(vertex)
            .filter(|v| v.is_leaf())
            .map(Vertex::index)
            .collect()
    }

    /// Returns the leaf indices of the whole tree in pre-order.
    pub fn leaf_indices(&self) -> Vec<VertexIndex> {
        self.leaves_of(self.root_index)
    }

    /// Returns the gene names of all leaves in pre-order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.pre_order_iter().filter_map(Vertex::label).collect()
    }

    /// Returns the number of leaves below each vertex, indexed by [VertexIndex].
    pub fn leaf_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.vertices.len()];
        for vertex in self.post_order_iter() {
            counts[vertex.index()] = if vertex.is_leaf() {
                1
            } else {
                vertex.children().iter().map(|&c| counts[c]).sum()
            };
        }
        counts
    }

    /// Returns the number of leaves below `vertex`.
    pub fn leaf_count_of(&self, vertex: VertexIndex) -> usize {
        self.pre_order_iter_from(vertex).filter(|v| v.is_leaf()).count()
    }

    /// Returns the first leaf in pre-order with the given gene name.
    pub fn find_leaf(&self, name: &str) -> Option<VertexIndex> {
        self.pre_order_iter()
            .find(|v| v.label() == Some(name))
            .map(Vertex::index)
    }

    /// Returns the distinct species tags of all leaves.
    pub fn species(&self) -> BTreeSet<&str> {
        self.vertices.iter().filter_map(Vertex::species).collect()
    }

    /// Returns an iterator over the proper ancestors of `vertex`, nearest first.
    pub fn ancestors(&self, vertex: VertexIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self[vertex].parent_index(),
        }
    }

    /// Returns the most recent common ancestor of `a` and `b`.
    ///
    /// A vertex is its own ancestor, so `mrca(a, a) == a`.
    pub fn mrca(&self, a: VertexIndex, b: VertexIndex) -> VertexIndex {
        let mut lineage: HashSet<VertexIndex> = self.ancestors(a).collect();
        lineage.insert(a);
        if lineage.contains(&b) {
            return b;
        }
        self.ancestors(b)
            .find(|anc| lineage.contains(anc))
            .unwrap_or(self.root_index)
    }

    /// Returns the distance from `vertex` up to the root.
    pub fn distance_to_root(&self, vertex: VertexIndex) -> f64 {
        self.path_length_to(vertex, self.root_index)
    }

    /// Returns the sum of branch lengths on the path between `a` and `b`.
    pub fn distance(&self, a: VertexIndex, b: VertexIndex) -> f64 {
        let mrca = self.mrca(a, b);
        self.path_length_to(a, mrca) + self.path_length_to(b, mrca)
    }

    /// Returns `(leaf, distance)` for all leaves below `vertex` in pre-order,
    /// with distances measured from `vertex`.
    pub fn leaf_distances_from(&self, vertex: VertexIndex) -> Vec<(VertexIndex, f64)> {
        let mut result = Vec::new();
        let mut stack = vec![(vertex, 0.0)];
        while let Some((index, dist)) = stack.pop() {
            let current = &self[index];
            if current.is_leaf() {
                result.push((index, dist));
            }
            for &child in current.children().iter().rev() {
                stack.push((child, dist + self[child].dist()));
            }
        }
        result
    }

    /// Returns the leaf farthest from `vertex` within its subtree, and its distance.
    ///
    /// Ties go to the first leaf in pre-order.
    pub fn farthest_leaf(&self, vertex: VertexIndex) -> (VertexIndex, f64) {
        self.leaf_distances_from(vertex)
            .into_iter()
            .fold((vertex, f64::NEG_INFINITY), |best, (leaf, dist)| {
                if dist > best.1 { (leaf, dist) } else { best }
            })
    }

    /// Sums branch lengths from `vertex` upward until `ancestor` is reached.
    fn path_length_to(&self, vertex: VertexIndex, ancestor: VertexIndex) -> f64 {
        let mut length = 0.0;
        let mut current = vertex;
        while current != ancestor {
            let v = &self[current];
            length += v.dist();
            match v.parent_index() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        length
    }
}

// ============================================================================
// Traversals (pub)
// ============================================================================
impl GeneTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.is_root_set().then_some(self.root_index))
    }

    /// Returns a post-order iterator over the subtree rooted at `vertex`.
    pub fn post_order_iter_from(&self, vertex: VertexIndex) -> PostOrderIter<'_> {
        PostOrderIter::new(self, Some(vertex))
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.is_root_set().then_some(self.root_index))
    }

    /// Returns a pre-order iterator over the subtree rooted at `vertex`.
    pub fn pre_order_iter_from(&self, vertex: VertexIndex) -> PreOrderIter<'_> {
        PreOrderIter::new(self, Some(vertex))
    }

    /// Returns an iterator over the tree in level-order (breadth first).
    pub fn level_order_iter(&self) -> LevelOrderIter<'_> {
        LevelOrderIter::new(self, self.is_root_set().then_some(self.root_index))
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
pub struct PostOrderIter<'a> {
    tree: &'a GeneTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a GeneTree, start: Option<VertexIndex>) -> Self {
        PostOrderIter {
            tree,
            stack: start.map(|s| (s, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Reversed, so the first child is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
pub struct PreOrderIter<'a> {
    tree: &'a GeneTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a GeneTree, start: Option<VertexIndex>) -> Self {
        PreOrderIter {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];
        self.stack.extend(vertex.children().iter().rev());
        Some(vertex)
    }
}

/// Iterator for level-order traversal (breadth first, children in input order).
pub struct LevelOrderIter<'a> {
    tree: &'a GeneTree,
    queue: VecDeque<VertexIndex>,
}

impl<'a> LevelOrderIter<'a> {
    fn new(tree: &'a GeneTree, start: Option<VertexIndex>) -> Self {
        LevelOrderIter {
            tree,
            queue: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for LevelOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.queue.pop_front()?;
        let vertex = &self.tree[index];
        self.queue.extend(vertex.children());
        Some(vertex)
    }
}

/// Iterator over the proper ancestors of a vertex, from parent to root.
pub struct Ancestors<'a> {
    tree: &'a GeneTree,
    current: Option<VertexIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = VertexIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        self.current = self.tree[index].parent_index();
        Some(index)
    }
}
