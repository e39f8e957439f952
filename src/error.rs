use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    DataFormat(#[from] DataFormatError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

#[derive(Debug, thiserror::Error)]
pub enum DataFormatError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: column '{column}' is blank")]
    BlankCell { row: usize, column: &'static str },

    #[error("row {row}: column '{column}' has unparsable value '{value}'")]
    Unparsable {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("row {row}: unrecognized position '{label}'")]
    UnrecognizedPosition { row: usize, label: String },

    #[error("row {row}: age {age} outside plausible range {min}-{max}")]
    ImplausibleAge { row: usize, age: u32, min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum UnscorableRecordError {
    #[error("{player}: minutes played missing")]
    MissingMinutes { player: String },

    #[error("{player}: '{stat}' required by the {table} benchmark is missing")]
    MissingStat {
        player: String,
        table: &'static str,
        stat: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum InvalidValuationInputError {
    #[error("no value entered")]
    Empty,

    #[error("'{0}' is not a number (try 8000000 or 10m)")]
    Unparsable(String),

    #[error("value must be positive, got {0}")]
    NotPositive(f64),
}
