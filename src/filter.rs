use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::{PlayerRecord, Stat};

/// Goal involvement per 90 minutes:
/// `(goals + assists + 0.5*dribbles + 0.5*key_passes) / minutes * 90`.
///
/// Missing component stats count as zero; zero or missing minutes yields 0.
pub fn contribution_per90(record: &PlayerRecord) -> f64 {
    let minutes = record.minutes().unwrap_or(0.0);
    if minutes <= 0.0 {
        return 0.0;
    }
    let stat = |s: Stat| record.stat(s).unwrap_or(0.0);
    let involvement = stat(Stat::Goals)
        + stat(Stat::Assists)
        + 0.5 * stat(Stat::Dribbles)
        + 0.5 * stat(Stat::KeyPasses);
    involvement / minutes * 90.0
}

pub fn xg_per90(record: &PlayerRecord) -> Option<f64> {
    let minutes = record.minutes().filter(|m| *m > 0.0)?;
    let xg = record.stat(Stat::ExpectedGoals)?;
    Some(xg / minutes * 90.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFilter {
    #[default]
    Any,
    Label(String),
}

impl PositionFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            PositionFilter::Any
        } else {
            PositionFilter::Label(trimmed.to_ascii_uppercase())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    #[serde(default)]
    pub position: PositionFilter,
    pub league: Option<String>,
    pub min_minutes: Option<f64>,
    pub min_contribution_per90: Option<f64>,
    pub min_xg_per90: Option<f64>,
    #[serde(default)]
    pub min_stats: BTreeMap<Stat, f64>,
}

impl FilterCriteria {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn max_age(mut self, age: u32) -> Self {
        self.max_age = Some(age);
        self
    }

    pub fn min_age(mut self, age: u32) -> Self {
        self.min_age = Some(age);
        self
    }

    pub fn position(mut self, position: PositionFilter) -> Self {
        self.position = position;
        self
    }

    pub fn league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    pub fn min_minutes(mut self, minutes: f64) -> Self {
        self.min_minutes = Some(minutes);
        self
    }

    pub fn min_contribution_per90(mut self, rate: f64) -> Self {
        self.min_contribution_per90 = Some(rate);
        self
    }

    pub fn min_xg_per90(mut self, rate: f64) -> Self {
        self.min_xg_per90 = Some(rate);
        self
    }

    pub fn min_stat(mut self, stat: Stat, value: f64) -> Self {
        self.min_stats.insert(stat, value);
        self
    }

    pub fn is_any(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &PlayerRecord) -> bool {
        if self.min_age.is_some_and(|min| record.age < min) {
            return false;
        }
        if self.max_age.is_some_and(|max| record.age > max) {
            return false;
        }
        if let PositionFilter::Label(label) = &self.position
            && !record.plays(label)
        {
            return false;
        }
        if let Some(league) = &self.league
            && record.league.trim() != league.trim()
        {
            return false;
        }
        if let Some(min) = self.min_minutes
            && record.minutes().unwrap_or(0.0) < min
        {
            return false;
        }
        if let Some(min) = self.min_contribution_per90
            && contribution_per90(record) < min
        {
            return false;
        }
        if let Some(min) = self.min_xg_per90
            && !xg_per90(record).is_some_and(|v| v >= min)
        {
            return false;
        }
        self.min_stats
            .iter()
            .all(|(stat, min)| record.stat(*stat).is_some_and(|v| v >= *min))
    }
}

pub fn filter(records: &[PlayerRecord], criteria: &FilterCriteria) -> Vec<PlayerRecord> {
    filter_refs(records, criteria).into_iter().cloned().collect()
}

pub fn filter_refs<'a>(records: &'a [PlayerRecord], criteria: &FilterCriteria) -> Vec<&'a PlayerRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winger() -> PlayerRecord {
        PlayerRecord::new("Winger", 21, "MF,FW", "es La Liga")
            .with_stat(Stat::Minutes, 1800.0)
            .with_stat(Stat::Goals, 6.0)
            .with_stat(Stat::Assists, 4.0)
            .with_stat(Stat::Dribbles, 20.0)
            .with_stat(Stat::KeyPasses, 12.0)
    }

    #[test]
    fn contribution_uses_half_weight_for_creative_stats() {
        // (6 + 4 + 10 + 6) / 1800 * 90
        assert!((contribution_per90(&winger()) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn zero_minutes_contribution_is_zero() {
        let rec = PlayerRecord::new("Bench", 18, "FW", "x")
            .with_stat(Stat::Minutes, 0.0)
            .with_stat(Stat::Goals, 1.0);
        assert_eq!(contribution_per90(&rec), 0.0);
        let rec = PlayerRecord::new("NoMinutes", 18, "FW", "x").with_stat(Stat::Goals, 1.0);
        assert_eq!(contribution_per90(&rec), 0.0);
    }

    #[test]
    fn position_filter_is_substring_match() {
        let rec = PlayerRecord::new("Hybrid", 22, "MF,DF", "x");
        assert!(FilterCriteria::any().position(PositionFilter::parse("DF")).matches(&rec));
        assert!(FilterCriteria::any().position(PositionFilter::parse("mf")).matches(&rec));
        assert!(!FilterCriteria::any().position(PositionFilter::parse("FW")).matches(&rec));
        assert!(FilterCriteria::any().position(PositionFilter::parse("any")).matches(&rec));
    }

    #[test]
    fn min_stat_requires_presence() {
        let crit = FilterCriteria::any().min_stat(Stat::Tackles, 1.0);
        assert!(!crit.matches(&winger()));
        assert!(crit.matches(&winger().with_stat(Stat::Tackles, 1.0)));
    }

    #[test]
    fn xg_filter_rejects_missing_xg() {
        let crit = FilterCriteria::any().min_xg_per90(0.3);
        assert!(!crit.matches(&winger()));
        assert!(crit.matches(&winger().with_stat(Stat::ExpectedGoals, 7.0)));
        assert!(!crit.matches(&winger().with_stat(Stat::ExpectedGoals, 5.0)));
    }

    #[test]
    fn league_filter_compares_trimmed_names() {
        let crit = FilterCriteria::any().league(" es La Liga");
        assert!(crit.matches(&winger()));
        assert!(!FilterCriteria::any().league("it Serie A").matches(&winger()));
    }
}
