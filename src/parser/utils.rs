//! Label quoting helpers for writing Newick strings.
//!
//! Gene identifiers carry their species tag after an underscore, so labels are
//! never rewritten (no space to underscore substitution). Anything that would
//! not survive a re-parse is single quoted instead.

/// Characters that terminate an unquoted Newick label.
const SPECIAL_CHARACTERS: &[char] = &[' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\''];

/// Checks if a label must be single quoted to be read back unchanged.
///
/// # Examples
/// ```
/// # use cladenorm::parser::utils::needs_quoting;
/// assert!(!needs_quoting("P53_HUMAN"));
/// assert!(needs_quoting("P53 HUMAN"));
/// assert!(needs_quoting("Wilson's_HUMAN"));
/// assert!(needs_quoting(""));
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty() || label.contains(SPECIAL_CHARACTERS)
}

/// Quotes a label for a Newick string if needed.
///
/// Internal single quotes are escaped by doubling them.
///
/// # Examples
/// ```
/// # use cladenorm::parser::utils::quote_label;
/// assert_eq!(quote_label("P53_HUMAN"), "P53_HUMAN");
/// assert_eq!(quote_label("gene (copy)_MOUSE"), "'gene (copy)_MOUSE'");
/// assert_eq!(quote_label("Wilson's_HUMAN"), "'Wilson''s_HUMAN'");
/// ```
pub fn quote_label(label: &str) -> String {
    if needs_quoting(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
