//! Cladenorm computes normalised evolutionary distances on gene trees.
//!
//! Given a gene tree with branch lengths whose leaf names carry species tags
//! (`<gene>_<SPECIES>`), the crate roots the tree at a suitable outgroup,
//! classifies internal vertices as speciations or duplications, annotates
//! leaves with per-species table values and measures distances relative to
//! the median depth of a reference clade. This makes distances comparable
//! across trees of different depth.
//!
//! Core functionality provided:
//! - Newick: parse multifurcating trees with internal labels, comments and
//!   `[&key=value]` annotations; write trees back. See [crate::newick].
//! - Tree model: arena-based [GeneTree](model::GeneTree) with traversals,
//!   distances and MRCA queries. See [crate::model].
//! - Analysis: rooting by species age or midpoint, event classification,
//!   annotation, branch-length statistics, clade location and lineage event
//!   counts. See [crate::analysis].
//! - Pipeline: batch processing of tree files on a worker pool with CSV
//!   output. See [crate::pipeline].
//!
//! # Usage
//! ```
//! use cladenorm::analysis::{classify_events, lineage_events};
//! use cladenorm::newick::parse_str;
//!
//! let mut tree = parse_str("((a_HUMAN:1,b_MOUSE:1):1,(c_HUMAN:1,d_MOUSE:2):1);")?;
//! classify_events(&mut tree);
//!
//! let events = lineage_events(&tree, "a_HUMAN", "d_MOUSE")?;
//! assert_eq!(events.mrca.code(), "D");
//! assert_eq!(events.counts.speciations, 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A whole batch is run from a [RunConfig](pipeline::RunConfig):
//! ```no_run
//! use cladenorm::pipeline::{RunConfig, run};
//!
//! let config = RunConfig::from_toml_file("cladenorm.toml")?;
//! let summary = run(&config)?;
//! println!("{} trees processed", summary.processed);
//! # Ok::<(), cladenorm::pipeline::PipelineError>(())
//! ```

pub mod analysis;
pub mod model;
pub mod newick;
pub mod parser;
pub mod pipeline;
