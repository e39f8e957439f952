pub mod config;
pub mod error;
pub mod export;
pub mod fake_dataset;
pub mod filter;
pub mod lookup;
pub mod pipeline;
pub mod record_cache;
pub mod records;
pub mod scoring;
pub mod scoring_tables;
pub mod valuation;

pub use error::{
    DataFormatError, DataIntegrityError, InvalidValuationInputError, LoadError,
    UnscorableRecordError,
};
pub use filter::{FilterCriteria, PositionFilter, contribution_per90, filter};
pub use pipeline::{Query, QueryOutcome, ScoredRow, SortOrder, run_query};
pub use records::{PlayerRecord, Role, Stat};
pub use scoring::{ScoreResult, ScoringEngine};
pub use scoring_tables::ScoringTables;
pub use valuation::{ProjectionFormula, Roi, RoiTier, ValuationResult, parse_valuation, project};
