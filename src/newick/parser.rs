//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which parses single
//! (possibly multifurcating) gene trees with internal names, branch lengths
//! and optional `[&...]` or `[&&NHX:...]` annotations.

use crate::model::annotation::AnnotationValue;
use crate::model::tree_builder::TreeBuilder;
use crate::model::GeneTreeBuilder;
use crate::newick::defs::{DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use log::debug;

/// Key-value pairs of one annotation block, in input order.
type AnnotationBlock = Vec<(String, AnnotationValue)>;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for Newick gene trees.
///
/// Generic over [TreeBuilder] (construction).
///
/// # Configuration
/// * [`with_num_leaves(num_leaves)`](Self::with_num_leaves)
///     - Can be configured with number of leaves in trees to parse,
///       otherwise it is inferred from the first parsed tree and then stored.
/// * [`with_annotations()`](Self::with_annotations)
///     - Configures the parser to parse leaf annotations
///       (e.g. `[&group=Vertebrate]` or `[&&NHX:S=human]`) instead of treating them as comments.
///
/// # Example
/// ```
/// use cladenorm::newick::NewickParser;
/// use cladenorm::parser::ByteParser;
///
/// let input = "((a_HUMAN:1.0,b_MOUSE:1.0)0.9:0.5,c_YEAST:1.5,d_HUMAN:0.2);";
/// let mut byte_parser = ByteParser::for_str(input);
/// let mut newick_parser = NewickParser::new_defaults();
///
/// let tree = newick_parser.parse_str(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.root().children().len(), 3);
/// ```
pub struct NewickParser<T: TreeBuilder> {
    know_num_leaves: bool,
    num_leaves: usize,
    tree_builder: T,
    parse_annotations: bool,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Creates a new [NewickParser] with the given tree builder.
    pub fn new(tree_builder: T) -> Self {
        Self {
            know_num_leaves: false,
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
            tree_builder,
            parse_annotations: false,
        }
    }

    /// Sets the expected number of leaves in each parsed tree.
    ///
    /// This allows pre-allocation of data structures for better performance.
    /// If not set, the parser will count leaves during parsing.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self.know_num_leaves = true;
        self
    }

    /// Configures the parser to parse vertex annotations.
    pub fn with_annotations(mut self) -> Self {
        self.parse_annotations = true;
        self
    }
}

impl NewickParser<GeneTreeBuilder> {
    /// Creates a new [NewickParser] for [GeneTree](crate::model::GeneTree)
    /// with default settings:
    /// - Number of leaves is unknown (will be counted during parsing)
    /// - Annotations are skipped like comments
    pub fn new_defaults() -> Self {
        Self::new(GeneTreeBuilder::new())
    }
}

impl Default for NewickParser<GeneTreeBuilder> {
    fn default() -> Self {
        Self::new_defaults()
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses a single Newick tree from the given [ByteParser].
    ///
    /// Only whitespace and comments may follow the terminating `;`.
    ///
    /// # Returns
    /// * `Ok(T::Tree)` - The parsed gene tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<T::Tree, ParsingError> {
        parser.set_keep_annotations(self.parse_annotations);
        self.tree_builder.init_next(self.num_leaves);

        // If number of leaves not know yet, reset it to 0,
        // so actual count can now be tracked
        if !self.know_num_leaves {
            self.num_leaves = 0;
        }

        self.parse_root(parser)?;

        parser.skip_comment_and_whitespace()?;
        if !parser.is_eof() {
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Unexpected content after ';'".to_string(),
            ));
        }

        self.know_num_leaves = true;

        self.tree_builder
            .finish_tree()
            .ok_or_else(|| ParsingError::invalid_tree_structure(parser, "tree is incomplete".to_string()))
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl<T: TreeBuilder> NewickParser<T> {
    /// Parses root of tree and adds it to tree:
    /// - `(children)[name][annotation][:branch_length];`
    /// - A root branch length is accepted and dropped
    fn parse_root<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        let children = self.parse_children(parser)?;
        let name = self.parse_vertex_name(parser)?;
        let mut annotations = self.parse_annotations(parser)?;
        if let Some(length) = self.parse_branch_length(parser)? {
            debug!("Ignoring root branch length {length}");
        }
        annotations.extend(self.parse_annotations(parser)?);

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }

        let root_index = self.tree_builder.add_root(children, name);
        self.add_annotations(annotations, root_index);

        Ok(())
    }

    /// Parses a vertex (either internal vertex or leaf) and returns its index.
    fn parse_vertex<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<T::VertexIdx, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            self.parse_internal_vertex(parser)
        } else {
            self.parse_leaf(parser)
        }
    }

    /// Parses internal vertex, adds it to tree, and returns its index:
    /// - `(children)[name][annotation][:branch_length][annotation]`
    fn parse_internal_vertex<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<T::VertexIdx, ParsingError> {
        let children = self.parse_children(parser)?;
        let name = self.parse_vertex_name(parser)?;
        let mut annotations = self.parse_annotations(parser)?;
        let branch_length = self.parse_branch_length(parser)?;
        annotations.extend(self.parse_annotations(parser)?);

        let index = self.tree_builder.add_internal(children, branch_length, name);
        self.add_annotations(annotations, index);

        Ok(index)
    }

    /// Parses a comma separated children list `(c1,c2,...)` and returns their indices:
    /// - Expects parser at opening `(`
    ///   (caller should skip leading comments/whitespace)
    fn parse_children<B: ByteSource>(
        &mut self,
        parser: &mut ByteParser<B>,
    ) -> Result<Vec<T::VertexIdx>, ParsingError> {
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", next_char),
            ));
        }

        let mut children = vec![self.parse_vertex(parser)?];
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b',') {
                children.push(self.parse_vertex(parser)?);
            } else if parser.consume_if(b')') {
                break;
            } else if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            } else {
                let next_char = parser.peek().map(char::from);
                return Err(ParsingError::invalid_newick_string(
                    parser,
                    format!("Expected ',' or ')' after child but found {:?}", next_char),
                ));
            }
        }

        Ok(children)
    }

    /// Parses the optional name after a closing parenthesis.
    fn parse_vertex_name<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<Option<String>, ParsingError> {
        let name = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok((!name.is_empty()).then_some(name))
    }

    /// Parses leaf vertex and adds it to tree:
    /// - `label[annotation][:branch_length][annotation]`
    /// - Expects parser at start of label
    fn parse_leaf<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<T::VertexIdx, ParsingError> {
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let mut annotations = self.parse_annotations(parser)?;
        let branch_length = self.parse_branch_length(parser)?;
        annotations.extend(self.parse_annotations(parser)?);

        if !self.know_num_leaves {
            self.num_leaves += 1;
        }

        let leaf_index = self.tree_builder.add_leaf(branch_length, label);
        self.add_annotations(annotations, leaf_index);

        Ok(leaf_index)
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    /// - Rejects negative and non-finite values
    fn parse_branch_length<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<Option<f64>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                branch_length_str.push(b as char);
                parser.next_byte();
            } else {
                break;
            }
        }

        let value: f64 = branch_length_str
            .parse()
            .map_err(|_| ParsingError::invalid_branch_length(parser, format!("'{branch_length_str}'")))?;
        if value < 0.0 || !value.is_finite() {
            return Err(ParsingError::invalid_branch_length(
                parser,
                format!("{value} is negative or not finite"),
            ));
        }
        Ok(Some(value))
    }

    /// Parses an annotation block if present.
    ///
    /// Two flavours are understood:
    /// - `[&key=value,...]`
    /// - `[&&NHX:key=value:...]`
    ///
    /// Returns an empty block if annotations are disabled or the current
    /// position is not `[&`. Note that `[` without `&` is a regular comment.
    fn parse_annotations<B: ByteSource>(&mut self, parser: &mut ByteParser<B>) -> Result<AnnotationBlock, ParsingError> {
        let mut annotations = AnnotationBlock::new();
        if !self.parse_annotations {
            return Ok(annotations);
        }
        parser.skip_whitespace();

        let separator = if parser.consume_if_sequence(b"[&&NHX") {
            b':'
        } else if parser.consume_if_sequence(b"[&") {
            b','
        } else {
            return Ok(annotations);
        };
        let value_delimiters = [separator, b']'];
        if separator == b':' && !parser.consume_if(b':') {
            // "[&&NHX]" carries no pairs
            return self.close_annotations(parser, annotations);
        }

        loop {
            let key = parser.parse_unquoted_label(b"=,:]");
            if key.is_empty() || !parser.consume_if(b'=') {
                return Err(ParsingError::invalid_newick_string(
                    parser,
                    format!("Expected 'key=value' in annotation but found key {key:?}"),
                ));
            }

            let value_str = parser.parse_unquoted_label(&value_delimiters);
            if value_str.is_empty() {
                return Err(ParsingError::invalid_newick_string(
                    parser,
                    format!("Empty annotation value for key '{}'", key),
                ));
            }
            annotations.push((key, AnnotationValue::parse(&value_str)));

            if !parser.consume_if(separator) {
                break;
            }
        }

        self.close_annotations(parser, annotations)
    }

    fn close_annotations<B: ByteSource>(
        &self,
        parser: &mut ByteParser<B>,
        annotations: AnnotationBlock,
    ) -> Result<AnnotationBlock, ParsingError> {
        if !parser.consume_if(b']') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                "Expected ']' at end of annotation block".to_string(),
            ));
        }
        Ok(annotations)
    }

    /// Passes parsed annotations on to the [TreeBuilder].
    fn add_annotations(&mut self, annotations: AnnotationBlock, vertex_index: T::VertexIdx) {
        for (key, value) in annotations {
            self.tree_builder.add_feature(vertex_index, key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsingErrorType;

    fn parse(input: &str) -> Result<crate::model::GeneTree, ParsingError> {
        NewickParser::new_defaults().parse_str(&mut ByteParser::for_str(input))
    }

    #[test]
    fn test_internal_names_are_kept() {
        let tree = parse("((A_h,B_m)95:0.1,C_h)root;").unwrap();
        assert_eq!(tree.root().name(), Some("root"));
        let internal = tree.pre_order_iter().find(|v| v.is_internal()).unwrap();
        assert_eq!(internal.name(), Some("95"));
        assert_eq!(internal.dist(), 0.1);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("(A,B)").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse("((A,B);").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
        let err = parse("((A,B)").unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::UnexpectedEOF);
    }

    #[test]
    fn test_negative_branch_length() {
        let err = parse("(A:-1,B);").unwrap_err();
        assert!(matches!(err.kind(), ParsingErrorType::InvalidBranchLength(_)));
    }

    #[test]
    fn test_trailing_content() {
        assert!(parse("(A,B); (C,D);").is_err());
        assert!(parse("(A,B); [comment]\n").is_ok());
    }

    #[test]
    fn test_nhx_annotations() {
        let mut parser = NewickParser::new_defaults().with_annotations();
        let tree = parser
            .parse_str(&mut ByteParser::for_str("(A_h:1[&&NHX:group=V:rank=2],B_m[&group=I]);"))
            .unwrap();
        let a = tree.find_leaf("A_h").unwrap();
        assert_eq!(tree[a].feature("group"), Some(&AnnotationValue::from("V")));
        assert_eq!(tree[a].feature("rank"), Some(&AnnotationValue::Int(2)));
        let b = tree.find_leaf("B_m").unwrap();
        assert_eq!(tree[b].feature("group"), Some(&AnnotationValue::from("I")));
    }

    #[test]
    fn test_annotations_skipped_by_default() {
        let tree = parse("(A_h[&group=V]:2,B_m);").unwrap();
        let a = tree.find_leaf("A_h").unwrap();
        assert!(tree[a].feature("group").is_none());
        assert_eq!(tree[a].dist(), 2.0);
    }
}
