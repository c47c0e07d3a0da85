//! Reference tables shared by all trees of a batch.

use crate::analysis::{FeatureTable, SpeciesAges};
use crate::pipeline::error::PipelineError;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

// =#========================================================================#=
// AGE TABLE
// =#========================================================================#=
/// Species age ranks per phylome.
///
/// Read from a headerless TSV with the columns `phylome`, `species`, `age`;
/// lines starting with `#` are skipped. Numeric phylome ids are compared as
/// numbers, so `0076` and `76` name the same phylome.
#[derive(Debug, Clone, Default)]
pub struct AgeTable {
    phylomes: HashMap<String, SpeciesAges>,
}

impl AgeTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Reads an age table from any reader.
    ///
    /// ```
    /// # use cladenorm::pipeline::AgeTable;
    /// let table = AgeTable::from_reader("# phylome\tspecies\tage\n0076\tHUMAN\t1\n76\tYEAST\t5\n".as_bytes())?;
    /// assert_eq!(table.for_phylome("76")?.get("YEAST"), Some(&5));
    /// # Ok::<(), cladenorm::pipeline::PipelineError>(())
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut phylomes: HashMap<String, SpeciesAges> = HashMap::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let (phylome, species, age) = match (record.get(0), record.get(1), record.get(2)) {
                (Some(p), Some(s), Some(a)) if record.len() == 3 => (p, s, a),
                _ if is_blank(&record) => continue,
                _ => {
                    return Err(PipelineError::MalformedAgeTable {
                        line,
                        reason: format!("expected 3 fields, found {}", record.len()),
                    });
                }
            };
            let age = age.trim().parse::<i64>().map_err(|_| PipelineError::MalformedAgeTable {
                line,
                reason: format!("age '{age}' is not an integer"),
            })?;
            phylomes
                .entry(normalise_phylome_id(phylome))
                .or_default()
                .insert(species.trim().to_string(), age);
        }

        Ok(Self { phylomes })
    }

    /// Returns the species ages of one phylome.
    pub fn for_phylome(&self, phylome: &str) -> Result<&SpeciesAges, PipelineError> {
        self.phylomes
            .get(&normalise_phylome_id(phylome))
            .ok_or_else(|| PipelineError::UnknownPhylome(phylome.to_string()))
    }

    pub fn num_phylomes(&self) -> usize {
        self.phylomes.len()
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn normalise_phylome_id(id: &str) -> String {
    let id = id.trim();
    id.parse::<u64>().map_or_else(|_| id.to_string(), |n| n.to_string())
}

// =#========================================================================#=
// ANNOTATION TABLE
// =#========================================================================#=
/// Loads a CSV annotation table with a header row.
pub fn load_feature_table<P: AsRef<Path>>(path: P) -> Result<FeatureTable, PipelineError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    read_feature_table(file)
}

/// Reads a CSV annotation table with a header row from any reader.
pub fn read_feature_table<R: Read>(reader: R) -> Result<FeatureTable, PipelineError> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok(FeatureTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_table_groups_by_phylome() {
        let table = AgeTable::from_reader("1\tHUMAN\t1\n1\tYEAST\t4\n0002\tHUMAN\t7\n".as_bytes()).unwrap();
        assert_eq!(table.num_phylomes(), 2);
        assert_eq!(table.for_phylome("0001").unwrap().len(), 2);
        assert_eq!(table.for_phylome("2").unwrap().get("HUMAN"), Some(&7));
        assert!(matches!(table.for_phylome("3"), Err(PipelineError::UnknownPhylome(_))));
    }

    #[test]
    fn test_age_table_rejects_bad_rows() {
        assert!(matches!(
            AgeTable::from_reader("1\tHUMAN\n".as_bytes()),
            Err(PipelineError::MalformedAgeTable { line: 1, .. })
        ));
        assert!(matches!(
            AgeTable::from_reader("# header\n1\tHUMAN\told\n".as_bytes()),
            Err(PipelineError::MalformedAgeTable { .. })
        ));
    }

    #[test]
    fn test_feature_table_with_short_rows() {
        let table = read_feature_table("Proteome,Normalising group,Vertebrate\nHUMAN,A,vertebrate\nYEAST,B\n".as_bytes())
            .unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_index("Vertebrate"), Some(2));
    }
}
