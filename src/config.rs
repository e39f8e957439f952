use std::env;
use std::path::PathBuf;

use log::warn;

use crate::valuation::ProjectionFormula;

pub const DEFAULT_DATA_PATH: &str = "data/players.csv";
pub const DEFAULT_MIN_MINUTES: f64 = 300.0;

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub data_path: PathBuf,
    pub min_minutes: f64,
    pub formula: ProjectionFormula,
    pub limit: Option<usize>,
    pub threads: Option<usize>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            min_minutes: DEFAULT_MIN_MINUTES,
            formula: ProjectionFormula::default(),
            limit: None,
            threads: None,
        }
    }
}

/// Loads `.env.local` then `.env` into the process environment. Either may be missing,
/// and variables already set win.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let data_path = lookup("YSP_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or(defaults.data_path);
        let min_minutes = lookup("YSP_MIN_MINUTES")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(defaults.min_minutes);
        let formula = match lookup("YSP_FORMULA") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<ProjectionFormula>().unwrap_or_else(|err| {
                warn!("{err}; using {}", defaults.formula);
                defaults.formula
            }),
            _ => defaults.formula,
        };
        let limit = lookup("YSP_LIMIT")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0);
        let threads = lookup("YSP_THREADS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0);

        Self {
            data_path,
            min_minutes,
            formula,
            limit,
            threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ScoutConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ScoutConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = from_pairs(&[]);
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(cfg.min_minutes, 300.0);
        assert_eq!(cfg.formula, ProjectionFormula::linear_to_cap());
        assert_eq!(cfg.limit, None);
    }

    #[test]
    fn parses_overrides_and_ignores_junk() {
        let cfg = from_pairs(&[
            ("YSP_DATA_PATH", " fixtures/p.csv "),
            ("YSP_MIN_MINUTES", "900"),
            ("YSP_FORMULA", "ratio"),
            ("YSP_LIMIT", "0"),
            ("YSP_THREADS", "4"),
        ]);
        assert_eq!(cfg.data_path, PathBuf::from("fixtures/p.csv"));
        assert_eq!(cfg.min_minutes, 900.0);
        assert_eq!(cfg.formula, ProjectionFormula::RatioRoi);
        assert_eq!(cfg.limit, None);
        assert_eq!(cfg.threads, Some(4));

        let cfg = from_pairs(&[("YSP_FORMULA", "nope"), ("YSP_MIN_MINUTES", "-5")]);
        assert_eq!(cfg.formula, ProjectionFormula::linear_to_cap());
        assert_eq!(cfg.min_minutes, 300.0);
    }
}
