//! Newick format parser and writer for gene trees.
//!
//! This module provides [NewickParser] to parse Newick strings into
//! [GeneTree]s, and [to_newick] to write them back.
//!
//! # Quick API
//! * [`parse_str`] - parses a single string with default settings
//! * [`parse_str_with_annotations`] - same, but keeps `[&...]` annotations as leaf features
//!
//! # Format
//! The parser accepts the following grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [name] [annotation] [branch_length] [annotation]`
//! * `leaf ::= label [annotation] [branch_length] [annotation]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Labels may be single quoted, with `''` for a literal quote
//! * A missing branch length becomes [DEFAULT_BRANCH_LENGTH](crate::model::DEFAULT_BRANCH_LENGTH)
//!
//! Annotations come as `[&key=value,...]` or `[&&NHX:key=value:...]`.
//! They are skipped like comments unless enabled via
//! [NewickParser::with_annotations]; only leaf annotations are stored.

mod defs;
pub mod parser;
pub mod writer;

pub use parser::NewickParser;
pub use writer::{NewickStyle, to_newick};

use crate::model::GeneTree;
use crate::parser::ByteParser;
use crate::parser::ParsingError;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string to obtain a [GeneTree].
///
/// # Example
/// ```
/// use cladenorm::newick::parse_str;
///
/// let tree = parse_str("(Q1_HUMAN:0.1,(Q2_MOUSE:0.2,Q3_RAT:0.3):0.05);")?;
/// assert_eq!(tree.leaf_names(), vec!["Q1_HUMAN", "Q2_MOUSE", "Q3_RAT"]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<GeneTree, ParsingError> {
    let mut newick_parser = NewickParser::new_defaults();
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    newick_parser.parse_str(&mut byte_parser)
}

/// Parses a single Newick string, storing leaf annotations as features.
pub fn parse_str_with_annotations<S: AsRef<str>>(newick: S) -> Result<GeneTree, ParsingError> {
    let mut newick_parser = NewickParser::new_defaults().with_annotations();
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    newick_parser.parse_str(&mut byte_parser)
}
