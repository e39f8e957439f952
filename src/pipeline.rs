use std::cmp::Ordering;
use std::collections::HashMap;

use log::warn;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{InvalidValuationInputError, UnscorableRecordError};
use crate::filter::{self, FilterCriteria, xg_per90};
use crate::lookup::transfermarkt_search_url;
use crate::records::PlayerRecord;
use crate::scoring::{ScoreResult, ScoringEngine};
use crate::valuation::{self, ProjectionContext, ProjectionFormula, ValuationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    #[default]
    Input,
    ScoreDesc,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub criteria: FilterCriteria,
    pub formula: ProjectionFormula,
    pub valuations: HashMap<String, String>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn with_formula(mut self, formula: ProjectionFormula) -> Self {
        self.formula = formula;
        self
    }

    pub fn with_valuation(mut self, player: impl Into<String>, text: impl Into<String>) -> Self {
        self.valuations.insert(player.into(), text.into());
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn valuation_for(&self, name: &str) -> Option<&str> {
        self.valuations
            .get(name)
            .or_else(|| {
                let name = name.trim();
                self.valuations
                    .iter()
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredRow {
    pub record: PlayerRecord,
    pub score: ScoreResult,
    pub valuation: Option<Result<ValuationResult, InvalidValuationInputError>>,
    pub lookup_url: String,
}

impl ScoredRow {
    pub fn new(record: PlayerRecord, score: ScoreResult) -> Self {
        let lookup_url = transfermarkt_search_url(&record.name);
        Self {
            record,
            score,
            valuation: None,
            lookup_url,
        }
    }

    pub fn annotate_valuation(&mut self, text: &str, formula: ProjectionFormula) {
        let ctx = ProjectionContext {
            xg_per90: xg_per90(&self.record),
        };
        let result = valuation::project_text(self.score.score, text, formula, ctx);
        if let Err(err) = &result {
            warn!("valuation for {} rejected: {err}", self.record.name);
        }
        self.valuation = Some(result);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub name: String,
    pub error: UnscorableRecordError,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutcome {
    pub rows: Vec<ScoredRow>,
    pub skipped: Vec<SkippedRecord>,
}

pub fn score_all(records: &[&PlayerRecord], engine: &ScoringEngine<'_>) -> QueryOutcome {
    let results: Vec<Result<ScoredRow, SkippedRecord>> = records
        .par_iter()
        .map(|record| match engine.score(record) {
            Ok(score) => Ok(ScoredRow::new((*record).clone(), score)),
            Err(error) => Err(SkippedRecord {
                name: record.name.clone(),
                error,
            }),
        })
        .collect();

    let mut outcome = QueryOutcome::default();
    for result in results {
        match result {
            Ok(row) => outcome.rows.push(row),
            Err(skipped) => {
                warn!("skipping unscorable record: {}", skipped.error);
                outcome.skipped.push(skipped);
            }
        }
    }
    outcome
}

pub fn run_query(records: &[PlayerRecord], query: &Query, engine: &ScoringEngine<'_>) -> QueryOutcome {
    let selected = filter::filter_refs(records, &query.criteria);
    let mut outcome = score_all(&selected, engine);

    if query.sort == SortOrder::ScoreDesc {
        sort_by_score_desc(&mut outcome.rows);
    }
    if let Some(limit) = query.limit {
        outcome.rows.truncate(limit);
    }

    for row in &mut outcome.rows {
        if let Some(text) = query.valuation_for(&row.record.name) {
            row.annotate_valuation(text, query.formula);
        }
    }
    outcome
}

pub fn sort_by_score_desc(rows: &mut [ScoredRow]) {
    rows.sort_by(|a, b| {
        b.score
            .score
            .partial_cmp(&a.score.score)
            .unwrap_or(Ordering::Equal)
    });
}
