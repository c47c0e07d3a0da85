//! Tree batch files: one tab-separated record per line.

use crate::pipeline::config::Mode;
use crate::pipeline::error::PipelineError;
use std::path::Path;

/// Seed id used for bare Newick lines in pairwise mode.
pub const BARE_TREE_SEED: &str = "sp";

/// Field of a batch line holding the Newick string.
const NEWICK_FIELD: usize = 3;

/// One tree of a batch and the id of its seed leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRecord {
    pub seed: String,
    pub newick: String,
}

impl TreeRecord {
    /// Parses one batch line, `seed \t _ \t _ \t newick`.
    ///
    /// Returns `None` for blank lines. In pairwise mode a line without any
    /// tab is a bare Newick tree with seed [BARE_TREE_SEED].
    ///
    /// # Errors
    /// [PipelineError::MalformedRecord] if the line has fewer than four fields.
    ///
    /// # Example
    /// ```
    /// use cladenorm::pipeline::{Mode, TreeRecord};
    ///
    /// let line = "Phy1_HUMAN\t1\tJTT\t(Phy1_HUMAN:1,Phy2_YEAST:2);";
    /// let record = TreeRecord::parse_line(1, line, Mode::CladeDistance).unwrap().unwrap();
    /// assert_eq!(record.seed, "Phy1_HUMAN");
    /// ```
    pub fn parse_line(line_number: usize, line: &str, mode: Mode) -> Result<Option<Self>, PipelineError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        if !line.contains('\t') && mode == Mode::Pairwise {
            return Ok(Some(TreeRecord {
                seed: BARE_TREE_SEED.to_string(),
                newick: line.trim().to_string(),
            }));
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= NEWICK_FIELD {
            return Err(PipelineError::MalformedRecord {
                line: line_number,
                reason: format!("expected at least 4 tab-separated fields, found {}", fields.len()),
            });
        }

        Ok(Some(TreeRecord {
            seed: fields[0].trim().to_string(),
            newick: fields[NEWICK_FIELD].trim().to_string(),
        }))
    }
}

/// Parses every record of a batch; line numbers start at 1.
pub fn parse_batch(content: &str, mode: Mode) -> Result<Vec<TreeRecord>, PipelineError> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(record) = TreeRecord::parse_line(idx + 1, line, mode)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Reads and parses a batch file.
pub fn read_batch<P: AsRef<Path>>(path: P, mode: Mode) -> Result<Vec<TreeRecord>, PipelineError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    parse_batch(&content, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_skipped() {
        let content = "s1\ta\tb\t(A,B);\n\n   \ns2\ta\tb\t(C,D);\r\n";
        let records = parse_batch(content, Mode::CladeDistance).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].newick, "(C,D);");
    }

    #[test]
    fn test_too_few_fields() {
        assert!(matches!(
            parse_batch("s1\t(A,B);\n", Mode::CladeDistance),
            Err(PipelineError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_bare_tree_only_in_pairwise_mode() {
        let record = TreeRecord::parse_line(1, "(A,B);", Mode::Pairwise).unwrap().unwrap();
        assert_eq!(record.seed, BARE_TREE_SEED);
        assert!(TreeRecord::parse_line(1, "(A,B);", Mode::CladeDistance).is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let record = TreeRecord::parse_line(3, "s\t1\t2\t(A,B);\textra", Mode::CladeDistance)
            .unwrap()
            .unwrap();
        assert_eq!(record.newick, "(A,B);");
    }
}
