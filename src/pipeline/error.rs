//! Error type of the batch pipeline.

use crate::analysis::AnalysisError;
use crate::parser::ParsingError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading inputs, processing trees or writing outputs.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A tree batch line that is not `seed \t _ \t _ \t newick`
    #[error("Malformed tree record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Malformed age table on line {line}: {reason}")]
    MalformedAgeTable { line: usize, reason: String },

    #[error("Phylome '{0}' not found in age table")]
    UnknownPhylome(String),

    #[error("Failed to parse tree '{seed}': {source}")]
    Parse {
        seed: String,
        #[source]
        source: ParsingError,
    },

    #[error("Failed to analyse tree '{seed}': {source}")]
    Analysis {
        seed: String,
        #[source]
        source: AnalysisError,
    },

    /// Processing a tree panicked; the other trees of the batch are unaffected
    #[error("Processing tree '{seed}' panicked: {message}")]
    Panicked { seed: String, message: String },

    #[error("{0} trees failed")]
    TreeFailures(usize),

    #[error("A worker thread panicked")]
    WorkerPanicked,
}

impl PipelineError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a closure wrapping an [AnalysisError] of tree `seed`.
    pub(crate) fn analysis(seed: &str) -> impl Fn(AnalysisError) -> Self + '_ {
        move |source| PipelineError::Analysis {
            seed: seed.to_string(),
            source,
        }
    }
}
