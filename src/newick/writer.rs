//! Newick serialization of gene trees.

use crate::model::tree::{GeneTree, VertexIndex};
use crate::model::vertex::Vertex;
use crate::parser::utils::quote_label;

/// Rough number of characters per vertex used to pre-size the output.
const CHARS_PER_VERTEX: usize = 16;

/// Style for serializing a tree to Newick format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewickStyle {
    /// Leaf names and structure only
    Topology,
    /// Leaf names, internal names and branch lengths
    BranchLengths,
    /// As [NewickStyle::BranchLengths], plus NHX blocks with events and leaf features
    Annotated,
}

/// Returns the Newick representation of the tree with closing semicolon.
///
/// Labels that would not survive a re-parse are single quoted.
///
/// # Example
/// ```
/// use cladenorm::model::{BranchLength, GeneTree};
/// use cladenorm::newick::{NewickStyle, to_newick};
///
/// let mut tree = GeneTree::new(2);
/// let a = tree.add_leaf(BranchLength::new(1.0), "a_HUMAN".to_string());
/// let b = tree.add_leaf(BranchLength::new(2.5), "b MOUSE".to_string());
/// tree.add_root(vec![a, b], None);
///
/// assert_eq!(to_newick(&tree, NewickStyle::BranchLengths), "(a_HUMAN:1,'b MOUSE':2.5);");
/// assert_eq!(to_newick(&tree, NewickStyle::Topology), "(a_HUMAN,'b MOUSE');");
/// ```
pub fn to_newick(tree: &GeneTree, style: NewickStyle) -> String {
    let mut newick = String::with_capacity(tree.num_vertices() * CHARS_PER_VERTEX);
    if tree.is_root_set() {
        build_newick(tree, &mut newick, tree.root_index(), style);
    }
    newick.push(';');
    newick
}

/// Recursive helper for building the Newick string
fn build_newick(tree: &GeneTree, newick: &mut String, index: VertexIndex, style: NewickStyle) {
    let vertex = &tree[index];

    if let Some(label) = vertex.label() {
        newick.push_str(&quote_label(label));
    } else {
        newick.push('(');
        for (i, &child) in vertex.children().iter().enumerate() {
            if i > 0 {
                newick.push(',');
            }
            build_newick(tree, newick, child, style);
        }
        newick.push(')');
        match vertex.name() {
            Some(name) if style != NewickStyle::Topology => newick.push_str(&quote_label(name)),
            _ => {}
        }
    }

    if style == NewickStyle::Topology {
        return;
    }
    if let Some(branch_length) = vertex.branch_length() {
        newick.push(':');
        newick.push_str(&branch_length.to_string());
    }
    if style == NewickStyle::Annotated {
        push_nhx(newick, vertex);
    }
}

fn push_nhx(newick: &mut String, vertex: &Vertex) {
    let mut pairs: Vec<String> = Vec::new();
    if let Some(event) = vertex.event() {
        pairs.push(format!("evoltype={event}"));
    }
    if let Some(features) = vertex.features() {
        pairs.extend(features.iter().map(|(k, v)| format!("{k}={v}")));
    }
    if !pairs.is_empty() {
        newick.push_str("[&&NHX:");
        newick.push_str(&pairs.join(":"));
        newick.push(']');
    }
}
