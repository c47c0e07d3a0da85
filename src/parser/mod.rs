//! Basic low-level byte parser functionality.
//!
//! Supporting infrastructure for the Newick reader: byte sources, a
//! peek/consume parser and the [ParsingError] type.

pub mod byte_parser;
pub mod byte_source;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
