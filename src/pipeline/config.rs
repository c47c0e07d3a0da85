//! Run configuration, loaded from TOML and overridden from the command line.
//!
//! ```toml
//! input = "data/0076_108.txt"
//! groups = "data/0076_norm_groups.csv"
//! ages = "data/phylome_ages.tsv"
//! output_dir = "outputs"
//! workers = 4
//!
//! [[targets]]
//! name = "vert"
//! column = "Vertebrate"
//! tag = "vertebrate"
//! ```

use crate::pipeline::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What is computed for each tree of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Seed-to-clade distances, one record per tree
    #[default]
    CladeDistance,
    /// Leaf-to-leaf distances and events, one record per leaf pair
    Pairwise,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::CladeDistance => write!(f, "clade-distance"),
            Mode::Pairwise => write!(f, "pairwise"),
        }
    }
}

// =#========================================================================#=
// TARGET GROUP
// =#========================================================================#=
/// A clade to measure the seed distance to.
///
/// The clade is the largest one whose leaves share one value of `column`.
/// With `must_include_seed` it must also contain the seed leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Prefix of the output fields, e.g. `vert` for `vert_dist`
    pub name: String,
    pub column: String,
    pub tag: String,
    #[serde(default = "default_true")]
    pub must_include_seed: bool,
}

impl TargetGroup {
    pub fn new(name: &str, column: &str, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            tag: tag.to_string(),
            must_include_seed: true,
        }
    }
}

/// Parses `name=column:tag`, optionally followed by `:seed` or `:any`.
///
/// ```
/// # use cladenorm::pipeline::TargetGroup;
/// let target: TargetGroup = "met=Metazoan:metazoan:any".parse().unwrap();
/// assert_eq!(target.column, "Metazoan");
/// assert!(!target.must_include_seed);
/// ```
impl FromStr for TargetGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected name=column:tag, got '{s}'"))?;
        let mut parts = rest.split(':');
        let (Some(column), Some(tag)) = (parts.next(), parts.next()) else {
            return Err(format!("expected name=column:tag, got '{s}'"));
        };
        let must_include_seed = match parts.next() {
            None | Some("seed") => true,
            Some("any") => false,
            Some(other) => return Err(format!("unknown target option '{other}'")),
        };
        if parts.next().is_some() || name.is_empty() || column.is_empty() {
            return Err(format!("expected name=column:tag, got '{s}'"));
        }

        Ok(TargetGroup {
            name: name.to_string(),
            column: column.to_string(),
            tag: tag.to_string(),
            must_include_seed,
        })
    }
}

// =#========================================================================#=
// TREE FILTER
// =#========================================================================#=
/// Pairwise mode only processes trees with many species and few paralogs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeFilter {
    pub enabled: bool,
    /// Trees need strictly more species than this
    pub min_species: usize,
    /// Trees need strictly fewer leaves than this many per species
    pub max_leaf_species_ratio: usize,
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            min_species: 10,
            max_leaf_species_ratio: 3,
        }
    }
}

impl TreeFilter {
    /// Returns `true` if a tree with these counts is processed.
    pub fn accepts(&self, num_species: usize, num_leaves: usize) -> bool {
        !self.enabled || (num_species > self.min_species && num_leaves < self.max_leaf_species_ratio * num_species)
    }
}

// =#========================================================================#=
// RUN CONFIG
// =#========================================================================#=
/// Configuration of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Tree batch file
    pub input: PathBuf,
    /// Annotation table (CSV)
    pub groups: PathBuf,
    /// Species age table (TSV), required for clade-distance mode
    pub ages: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Defaults to the input file name up to the first `_`
    pub phylome: Option<String>,
    pub workers: usize,
    pub mode: Mode,
    pub species_column: String,
    pub norm_column: String,
    pub norm_tag: String,
    pub targets: Vec<TargetGroup>,
    pub filter: TreeFilter,
    /// Fail the run if any tree fails
    pub strict: bool,
    /// Overwrite existing outputs
    pub force: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            groups: PathBuf::new(),
            ages: None,
            output_dir: PathBuf::from("outputs"),
            phylome: None,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            mode: Mode::default(),
            species_column: "Proteome".to_string(),
            norm_column: "Normalising group".to_string(),
            norm_tag: "A".to_string(),
            targets: vec![
                TargetGroup::new("vert", "Vertebrate", "vertebrate"),
                TargetGroup::new("met", "Metazoan", "metazoan"),
            ],
            filter: TreeFilter::default(),
            strict: false,
            force: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl RunConfig {
    /// Reads a configuration file; missing keys take their default.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Checks that the configuration describes a runnable batch.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: &str| Err(PipelineError::InvalidConfig(msg.to_string()));

        if self.input.as_os_str().is_empty() {
            return invalid("no input file given");
        }
        if self.groups.as_os_str().is_empty() {
            return invalid("no annotation table given");
        }
        if self.workers == 0 {
            return invalid("workers must be at least 1");
        }
        if self.mode == Mode::CladeDistance && self.ages.is_none() {
            return invalid("clade-distance mode requires an age table");
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            if target.name == "seed" || !names.insert(target.name.as_str()) {
                return Err(PipelineError::InvalidConfig(format!(
                    "target name '{}' is reserved or used twice",
                    target.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the phylome id, by default the input file name up to the first `_`.
    pub fn phylome_id(&self) -> String {
        self.phylome.clone().unwrap_or_else(|| {
            let file_name = file_name(&self.input);
            file_name.split('_').next().unwrap_or_default().to_string()
        })
    }

    /// Returns the output paths of this run's mode.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        let stem = file_name(&self.input);
        let stem = stem.split('.').next().unwrap_or_default();
        match self.mode {
            Mode::CladeDistance => vec![self.output_dir.join(format!("{stem}_dist.csv"))],
            Mode::Pairwise => vec![
                self.output_dir.join(format!("{stem}_dist.csv")),
                self.output_dir.join(format!("{stem}_norm.csv")),
            ],
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
