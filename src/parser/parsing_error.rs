//! Errors raised while reading a Newick string.
//!
//! A [ParsingError] pairs a [ParsingErrorType] with the byte offset at which
//! it was detected and a snippet of the input following it.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use thiserror::Error;

/// Number of input bytes captured as context.
const CONTEXT_LENGTH: usize = 50;

/// What went wrong while parsing.
#[derive(Error, PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    #[error("Unexpected end of input")]
    UnexpectedEOF,
    #[error("Unclosed comment")]
    UnclosedComment,
    #[error("Unclosed quoted label")]
    UnclosedQuote,
    #[error("Invalid newick string: {0}")]
    InvalidNewickString(String),
    #[error("Invalid branch length: {0}")]
    InvalidBranchLength(String),
    #[error("Invalid tree structure: {0}")]
    InvalidTreeStructure(String),
}

/// Parsing error with the position and upcoming bytes of the input.
///
/// ```
/// use cladenorm::newick::parse_str;
/// use cladenorm::parser::ParsingErrorType;
///
/// let err = parse_str("(a_HUMAN:0.1,b_MOUSE:x);").unwrap_err();
/// assert!(matches!(err.kind(), ParsingErrorType::InvalidBranchLength(_)));
/// assert_eq!(err.context(), "x);");
/// ```
#[derive(Error, Debug, Clone)]
#[error("{kind} at position {position}{}", format_context(.context))]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

fn format_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("\n  Context (next {} bytes): {context}", context.len())
    }
}

impl ParsingError {
    /// Captures the current position and context of `parser`.
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(CONTEXT_LENGTH),
        }
    }

    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    pub fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    pub fn unclosed_quote<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedQuote, parser)
    }

    pub fn invalid_newick_string<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    pub fn invalid_branch_length<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidBranchLength(msg), parser)
    }

    pub fn invalid_tree_structure<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidTreeStructure(msg), parser)
    }

    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Byte offset in the input at which the error was detected.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Input bytes following the error position, lossily decoded.
    pub fn context(&self) -> &str {
        &self.context
    }
}
