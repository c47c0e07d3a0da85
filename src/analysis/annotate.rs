//! Copying per-species table values onto leaves.

use crate::analysis::error::AnalysisError;
use crate::model::{AnnotationValue, GeneTree};
use std::collections::BTreeSet;

// =#========================================================================#=
// FEATURE TABLE
// =#========================================================================#=
/// A read-only table of string cells with named columns.
///
/// Rows are looked up by exact string match on a key column; the first
/// matching row wins.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FeatureTable {
    /// Creates a table from a header row and data rows.
    ///
    /// Short rows are treated as having empty trailing cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Returns the position of a column, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Returns the column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Returns the number of data rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the first row whose cell in `key_column` equals `key`.
    fn find_row(&self, key_column: usize, key: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.get(key_column).is_some_and(|cell| cell == key))
            .map(Vec::as_slice)
    }
}

// =#========================================================================#=
// FEATURE COLUMNS
// =#========================================================================#=
/// One or more column names to annotate.
///
/// A bare string always converts to a single column.
///
/// ```
/// # use cladenorm::analysis::FeatureColumns;
/// assert_eq!(FeatureColumns::from("Vertebrate").len(), 1);
/// assert_eq!(FeatureColumns::from(["Vertebrate", "Metazoa"]).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureColumns(Vec<String>);

impl FeatureColumns {
    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no column is requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the column names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for FeatureColumns {
    fn from(column: &str) -> Self {
        FeatureColumns(vec![column.to_string()])
    }
}

impl From<String> for FeatureColumns {
    fn from(column: String) -> Self {
        FeatureColumns(vec![column])
    }
}

impl From<Vec<String>> for FeatureColumns {
    fn from(columns: Vec<String>) -> Self {
        FeatureColumns(columns)
    }
}

impl From<&[String]> for FeatureColumns {
    fn from(columns: &[String]) -> Self {
        FeatureColumns(columns.to_vec())
    }
}

impl From<&[&str]> for FeatureColumns {
    fn from(columns: &[&str]) -> Self {
        FeatureColumns(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FeatureColumns {
    fn from(columns: [&str; N]) -> Self {
        FeatureColumns(columns.iter().map(|c| c.to_string()).collect())
    }
}

// =#========================================================================#=
// ANNOTATE
// =#========================================================================#=
/// Attaches the table values of each leaf's species to the leaf.
///
/// For every leaf and every requested column, the value of the first row
/// whose `species_column` equals the leaf's species tag is stored under the
/// column name, typed like a Newick annotation value.
///
/// Nothing is annotated unless every species has a row.
///
/// # Errors
/// * [AnalysisError::UnknownColumn] if the species column or a feature column is missing
/// * [AnalysisError::UnmatchedSpecies] with the sorted species tags lacking a row
pub fn annotate(
    tree: &mut GeneTree,
    table: &FeatureTable,
    species_column: &str,
    features: impl Into<FeatureColumns>,
) -> Result<(), AnalysisError> {
    let features = features.into();
    let key_column = table
        .column_index(species_column)
        .ok_or_else(|| AnalysisError::UnknownColumn(species_column.to_string()))?;
    let feature_columns = features
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .map(|idx| (name.to_string(), idx))
                .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut unmatched = BTreeSet::new();
    let mut assignments = Vec::new();
    for leaf in tree.leaf_indices() {
        let species = tree[leaf].species().unwrap_or_default();
        match table.find_row(key_column, species) {
            Some(row) => {
                for (name, idx) in &feature_columns {
                    let cell = row.get(*idx).map_or("", String::as_str);
                    assignments.push((leaf, name.clone(), AnnotationValue::parse(cell)));
                }
            }
            None => {
                unmatched.insert(species.to_string());
            }
        }
    }

    if !unmatched.is_empty() {
        return Err(AnalysisError::UnmatchedSpecies(unmatched.into_iter().collect()));
    }

    for (leaf, name, value) in assignments {
        tree[leaf].set_feature(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    fn table() -> FeatureTable {
        FeatureTable::new(
            vec!["Proteome".into(), "Vertebrate".into(), "Age".into()],
            vec![
                vec!["HUMAN".into(), "V".into(), "3".into()],
                vec!["MOUSE".into(), "V".into(), "2".into()],
                vec!["YEAST".into(), "NV".into()],
                vec!["HUMAN".into(), "duplicate".into(), "9".into()],
            ],
        )
    }

    #[test]
    fn test_first_matching_row_wins() {
        let mut tree = parse_str("(a_HUMAN,b_MOUSE);").unwrap();
        annotate(&mut tree, &table(), "Proteome", ["Vertebrate", "Age"]).unwrap();
        let a = tree.find_leaf("a_HUMAN").unwrap();
        assert_eq!(tree[a].feature("Vertebrate"), Some(&AnnotationValue::from("V")));
        assert_eq!(tree[a].feature("Age"), Some(&AnnotationValue::Int(3)));
    }

    #[test]
    fn test_bare_string_is_one_column() {
        let mut tree = parse_str("(a_HUMAN,b_YEAST);").unwrap();
        annotate(&mut tree, &table(), "Proteome", "Vertebrate").unwrap();
        let b = tree.find_leaf("b_YEAST").unwrap();
        assert_eq!(tree[b].features().unwrap().len(), 1);
    }

    #[test]
    fn test_short_row_gives_empty_string() {
        let mut tree = parse_str("(a_HUMAN,b_YEAST);").unwrap();
        annotate(&mut tree, &table(), "Proteome", "Age").unwrap();
        let b = tree.find_leaf("b_YEAST").unwrap();
        assert_eq!(tree[b].feature("Age"), Some(&AnnotationValue::from("")));
    }

    #[test]
    fn test_unmatched_species_are_collected() {
        let mut tree = parse_str("((a_HUMAN,b_sp9),(c_sp2,d_sp9));").unwrap();
        let err = annotate(&mut tree, &table(), "Proteome", "Vertebrate").unwrap_err();
        assert_eq!(err, AnalysisError::UnmatchedSpecies(vec!["sp2".into(), "sp9".into()]));
        let a = tree.find_leaf("a_HUMAN").unwrap();
        assert!(tree[a].feature("Vertebrate").is_none());
    }

    #[test]
    fn test_unknown_column() {
        let mut tree = parse_str("(a_HUMAN,b_MOUSE);").unwrap();
        assert_eq!(
            annotate(&mut tree, &table(), "Proteome", "Metazoa"),
            Err(AnalysisError::UnknownColumn("Metazoa".into()))
        );
        assert_eq!(
            annotate(&mut tree, &table(), "Species", "Age"),
            Err(AnalysisError::UnknownColumn("Species".into()))
        );
    }
}
