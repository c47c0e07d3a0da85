//! Speciation/duplication classification and event counting.

use crate::analysis::error::AnalysisError;
use crate::model::{Event, GeneTree, VertexIndex};
use std::collections::BTreeSet;

/// Classifies every non-leaf vertex by the species-overlap rule.
///
/// A vertex is a [Event::Duplication] if the species sets of any two of its
/// children intersect, and a [Event::Speciation] otherwise. The root is
/// classified as well. Existing events are overwritten.
///
/// # Example
/// ```
/// use cladenorm::analysis::classify_events;
/// use cladenorm::model::Event;
/// use cladenorm::newick::parse_str;
///
/// let mut tree = parse_str("((a_HUMAN,b_HUMAN),c_MOUSE);").unwrap();
/// classify_events(&mut tree);
/// assert_eq!(tree.root().event(), Some(Event::Speciation));
/// ```
pub fn classify_events(tree: &mut GeneTree) {
    let mut species: Vec<BTreeSet<String>> = vec![BTreeSet::new(); tree.num_vertices()];
    let mut events: Vec<(VertexIndex, Event)> = Vec::new();

    for vertex in tree.post_order_iter() {
        let index = vertex.index();
        if let Some(sp) = vertex.species() {
            species[index].insert(sp.to_string());
            continue;
        }

        let mut seen = BTreeSet::new();
        let mut event = Event::Speciation;
        for &child in vertex.children() {
            let child_species = std::mem::take(&mut species[child]);
            for sp in child_species {
                if !seen.insert(sp) {
                    event = Event::Duplication;
                }
            }
        }
        species[index] = seen;
        events.push((index, event));
    }

    for (index, event) in events {
        tree[index].set_event(Some(event));
    }
}

// =#========================================================================#=
// EVENT COUNTS
// =#========================================================================#=
/// Number of speciation and duplication vertices in a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub speciations: usize,
    pub duplications: usize,
}

impl EventCounts {
    /// Increments the counter of `event`.
    pub fn add(&mut self, event: Event) {
        match event {
            Event::Speciation => self.speciations += 1,
            Event::Duplication => self.duplications += 1,
        }
    }

    /// Returns the counter of `event`.
    pub fn get(&self, event: Event) -> usize {
        match event {
            Event::Speciation => self.speciations,
            Event::Duplication => self.duplications,
        }
    }

    /// Returns the total number of counted events.
    pub fn total(&self) -> usize {
        self.speciations + self.duplications
    }
}

/// Counts events of all vertices below (and including) `vertex` that have
/// more than one descendant leaf.
///
/// # Errors
/// [AnalysisError::Unclassified] if such a vertex carries no event.
pub fn count_events(tree: &GeneTree, vertex: VertexIndex) -> Result<EventCounts, AnalysisError> {
    let leaf_counts = tree.leaf_counts();
    let mut counts = EventCounts::default();

    for v in tree.pre_order_iter_from(vertex) {
        if leaf_counts[v.index()] > 1 {
            counts.add(v.event().ok_or(AnalysisError::Unclassified(v.index()))?);
        }
    }

    Ok(counts)
}

// =#========================================================================#=
// LINEAGE EVENTS
// =#========================================================================#=
/// Events separating two leaves, and the event at their common ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineageEvents {
    pub counts: EventCounts,
    pub mrca: Event,
}

/// Counts the events on the path between two leaves through their MRCA.
///
/// From each leaf, all proper ancestors whose leaf count does not exceed
/// that of the MRCA are tallied. The MRCA is reached from both sides, so one
/// of its events is removed again.
///
/// # Errors
/// * [AnalysisError::LeafNotFound] if a name is not a leaf of the tree
/// * [AnalysisError::SameLeaf] if both names are equal
/// * [AnalysisError::Unclassified] if a counted vertex carries no event
///
/// # Example
/// ```
/// use cladenorm::analysis::{classify_events, lineage_events};
/// use cladenorm::model::Event;
/// use cladenorm::newick::parse_str;
///
/// let mut tree = parse_str("((a_HUMAN,b_MOUSE),(c_HUMAN,d_MOUSE));").unwrap();
/// classify_events(&mut tree);
/// let events = lineage_events(&tree, "a_HUMAN", "d_MOUSE").unwrap();
///
/// assert_eq!(events.mrca, Event::Duplication);
/// assert_eq!(events.counts.speciations, 2);
/// assert_eq!(events.counts.duplications, 1);
/// ```
pub fn lineage_events(tree: &GeneTree, leaf_a: &str, leaf_b: &str) -> Result<LineageEvents, AnalysisError> {
    if leaf_a == leaf_b {
        return Err(AnalysisError::SameLeaf(leaf_a.to_string()));
    }
    let a = tree
        .find_leaf(leaf_a)
        .ok_or_else(|| AnalysisError::LeafNotFound(leaf_a.to_string()))?;
    let b = tree
        .find_leaf(leaf_b)
        .ok_or_else(|| AnalysisError::LeafNotFound(leaf_b.to_string()))?;
    lineage_events_between(tree, a, b)
}

/// [lineage_events] for two leaves given by index.
///
/// # Errors
/// * [AnalysisError::SameLeaf] if `a` and `b` are the same vertex
/// * [AnalysisError::Unclassified] if a counted vertex carries no event
pub fn lineage_events_between(tree: &GeneTree, a: VertexIndex, b: VertexIndex) -> Result<LineageEvents, AnalysisError> {
    if a == b {
        return Err(AnalysisError::SameLeaf(tree[a].label().unwrap_or_default().to_string()));
    }

    let mrca = tree.mrca(a, b);
    let mrca_event = tree[mrca].event().ok_or(AnalysisError::Unclassified(mrca))?;
    let leaf_counts = tree.leaf_counts();
    let limit = leaf_counts[mrca];

    let mut counts = EventCounts::default();
    for start in [a, b] {
        for ancestor in tree.ancestors(start) {
            if leaf_counts[ancestor] <= limit {
                counts.add(tree[ancestor].event().ok_or(AnalysisError::Unclassified(ancestor))?);
            }
        }
    }

    match mrca_event {
        Event::Speciation => counts.speciations -= 1,
        Event::Duplication => counts.duplications -= 1,
    }

    Ok(LineageEvents {
        counts,
        mrca: mrca_event,
    })
}
