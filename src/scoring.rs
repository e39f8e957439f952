use serde::Serialize;

use crate::error::UnscorableRecordError;
use crate::filter::contribution_per90;
use crate::records::{PlayerRecord, Role, Stat};
use crate::scoring_tables::{SATURATION, ScoringTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBasis {
    Benchmark(Role),
    /// Label matched no benchmark role: `goals*3 + assists*2 + minutes/250`.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub contribution_per90: f64,
    pub basis: ScoreBasis,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'a> {
    tables: &'a ScoringTables,
}

impl Default for ScoringEngine<'static> {
    fn default() -> Self {
        Self::new(ScoringTables::standard())
    }
}

impl<'a> ScoringEngine<'a> {
    pub fn new(tables: &'a ScoringTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'a ScoringTables {
        self.tables
    }

    pub fn score(&self, record: &PlayerRecord) -> Result<ScoreResult, UnscorableRecordError> {
        let minutes = record
            .minutes()
            .ok_or_else(|| UnscorableRecordError::MissingMinutes {
                player: record.name.clone(),
            })?;

        let (base, basis) = match record.primary_role() {
            Some(role) => (self.benchmark_score(record, role)?, ScoreBasis::Benchmark(role)),
            None => (fallback_score(record, minutes)?, ScoreBasis::Fallback),
        };

        let rate = contribution_per90(record);
        let bonus = if minutes > 0.0 {
            self.tables.contribution_bonus(rate)
        } else {
            0.0
        };

        let value = (base + bonus)
            * self.tables.age_multiplier(record.age)
            * self.tables.league_weight(&record.league);

        Ok(ScoreResult {
            score: round2(value).min(SATURATION),
            contribution_per90: rate,
            basis,
        })
    }

    /// Weighted sum of `stat / denominator * weight`; terms are not capped individually.
    fn benchmark_score(&self, record: &PlayerRecord, role: Role) -> Result<f64, UnscorableRecordError> {
        let mut total = 0.0;
        for bench in self.tables.benchmarks(role) {
            let value = record
                .stat(bench.stat)
                .ok_or_else(|| UnscorableRecordError::MissingStat {
                    player: record.name.clone(),
                    table: role.code(),
                    stat: bench.stat.label(),
                })?;
            total += value / bench.denominator * bench.weight;
        }
        Ok(total)
    }
}

fn fallback_score(record: &PlayerRecord, minutes: f64) -> Result<f64, UnscorableRecordError> {
    let need = |stat: Stat| {
        record.stat(stat).ok_or_else(|| UnscorableRecordError::MissingStat {
            player: record.name.clone(),
            table: "fallback",
            stat: stat.label(),
        })
    };
    Ok(need(Stat::Goals)? * 3.0 + need(Stat::Assists)? * 2.0 + minutes / 250.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
