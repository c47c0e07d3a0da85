//! Tree analysis engine.
//!
//! Functions in this module operate on a parsed [GeneTree](crate::model::GeneTree):
//! * [rooting]: outgroup selection by species age, midpoint rooting, re-rooting
//! * [events]: speciation/duplication classification and event counting
//! * [annotate]: attaching per-species table values to leaves
//! * [stats]: root-to-leaf distance statistics of a subtree
//! * [clade]: the largest clade with a uniform feature value
//!
//! A typical run roots a tree, classifies its events, annotates its leaves,
//! locates a reference clade and measures distances relative to it:
//! ```
//! use cladenorm::analysis::{
//!     FeatureTable, SpeciesAges, annotate, branch_stats, classify_events, locate_clade, root_by_age,
//! };
//! use cladenorm::newick::parse_str;
//!
//! let mut tree = parse_str("((a_HUMAN:1,b_MOUSE:1):1,(c_YEAST:2,d_HUMAN:1):1);")?;
//! let ages = SpeciesAges::from([("YEAST".to_string(), 3), ("HUMAN".to_string(), 1)]);
//! assert_eq!(root_by_age(&mut tree, &ages)?, "c_YEAST");
//! classify_events(&mut tree);
//!
//! let table = FeatureTable::new(
//!     vec!["Proteome".into(), "Group".into()],
//!     vec![
//!         vec!["HUMAN".into(), "A".into()],
//!         vec!["MOUSE".into(), "A".into()],
//!         vec!["YEAST".into(), "B".into()],
//!     ],
//! );
//! annotate(&mut tree, &table, "Proteome", "Group")?;
//!
//! let clade = locate_clade(&tree, "t1", "Group", "A", None)?;
//! assert_eq!(clade.leaf_count, 3);
//! let nfactor = branch_stats(&tree, clade.vertex).median;
//! assert!(nfactor > 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod annotate;
pub mod clade;
pub mod error;
pub mod events;
pub mod rooting;
pub mod stats;

pub use annotate::{FeatureColumns, FeatureTable, annotate};
pub use clade::{CladeRecord, locate_clade};
pub use error::AnalysisError;
pub use events::{EventCounts, LineageEvents, classify_events, count_events, lineage_events, lineage_events_between};
pub use rooting::{SpeciesAges, midpoint_outgroup, root_at_midpoint, root_by_age, set_outgroup};
pub use stats::{BranchStats, branch_stats};
