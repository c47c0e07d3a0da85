use cladenorm::parser::{ByteParser, ParsingErrorType};

const DELIMITERS: &[u8] = b"(),:;[ \t\n\r";

#[test]
fn test_skip_whitespace() {
    let mut parser = ByteParser::for_str(" \r  \t\n \t x y");
    parser.skip_whitespace();
    assert_eq!(parser.peek(), Some(b'x'));

    parser.next_byte(); // skip x
    parser.skip_whitespace();
    assert_eq!(parser.peek(), Some(b'y'));
}

#[test]
fn test_skip_comment() {
    let mut parser = ByteParser::for_str("[Gene tree of Phy0001] ((A:1,B:1):1,C:2)");
    assert!(parser.skip_comment().unwrap());
    assert_eq!(parser.next_byte(), Some(b' '));
    assert_eq!(parser.next_byte(), Some(b'('));
    assert!(!parser.skip_comment().unwrap());
}

#[test]
fn test_unclosed_comment() {
    let mut parser = ByteParser::for_str("[never closed");
    let err = parser.skip_comment().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedComment);
}

#[test]
fn test_annotation_is_comment_unless_kept() {
    let mut parser = ByteParser::for_str("[&sp=HUMAN]X");
    assert!(parser.skip_comment().unwrap());
    assert_eq!(parser.peek(), Some(b'X'));

    let mut parser = ByteParser::for_str("[&sp=HUMAN]X");
    parser.set_keep_annotations(true);
    assert!(!parser.skip_comment().unwrap());
    assert_eq!(parser.peek(), Some(b'['));
}

#[test]
fn test_consume_until() {
    let mut parser = ByteParser::for_str("consume a CAN of beans");
    assert!(parser.consume_until(b'C'));
    assert_eq!(parser.peek(), Some(b'A'));
    assert_eq!(parser.position(), 11);
    assert!(!parser.consume_until(b'Z'));
    assert!(parser.is_eof());
}

#[test]
fn test_consume_if_sequence() {
    let mut parser = ByteParser::for_str("&&NHX:D=Y");
    assert!(!parser.consume_if_sequence(b"&NHX"));
    assert!(parser.consume_if_sequence(b"&&NHX:"));
    assert_eq!(parser.peek(), Some(b'D'));
}

#[test]
fn test_position() {
    let mut parser = ByteParser::for_str("Where are we?");
    assert_eq!(parser.position(), 0);
    parser.peek();
    assert_eq!(parser.position(), 0);
    parser.next_byte();
    assert_eq!(parser.position(), 1);
}

#[test]
fn test_parse_unquoted_label() {
    let mut parser = ByteParser::for_str("Phy0001_HUMAN:0.5");
    let label = parser.parse_unquoted_label(DELIMITERS);
    assert_eq!(label, "Phy0001_HUMAN");
    assert_eq!(parser.peek(), Some(b':'));
}

#[test]
fn test_parse_quoted_label_with_escaped_quote() {
    let mut parser = ByteParser::for_str("'Wilson''s_storm-petrel',");
    let label = parser.parse_quoted_label().unwrap();
    assert_eq!(label, "Wilson's_storm-petrel");
    assert_eq!(parser.peek(), Some(b','));
}

#[test]
fn test_parse_quoted_label_unclosed() {
    let mut parser = ByteParser::for_str("'Scarabaeus viettei:0.5");
    let err = parser.parse_quoted_label().unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedQuote);
}

#[test]
fn test_parse_label_chooses_quoted() {
    let mut parser = ByteParser::for_str(" 'Quoted label' ");
    let label = parser.parse_label(DELIMITERS).unwrap();
    assert_eq!(label, "Quoted label");
}

#[test]
fn test_parse_label_keeps_utf8() {
    let mut parser = ByteParser::for_str("Gen_Ä,");
    assert_eq!(parser.parse_label(DELIMITERS).unwrap(), "Gen_Ä");
}

#[test]
fn test_get_context_as_string() {
    let mut parser = ByteParser::for_str("(A,B);");
    assert_eq!(parser.get_context_as_string(3), "(A,");
    parser.consume_until(b',');
    assert_eq!(parser.get_context_as_string(10), "B);");
}
