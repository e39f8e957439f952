use std::collections::HashMap;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::records::{Role, Stat};

pub const SATURATION: f64 = 100.0;
pub const UNKNOWN_LEAGUE_WEIGHT: f64 = 0.90;

static STANDARD: OnceCell<ScoringTables> = OnceCell::new();

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Benchmark {
    pub stat: Stat,
    pub denominator: f64,
    pub weight: f64,
}

const fn bench(stat: Stat, denominator: f64, weight: f64) -> Benchmark {
    Benchmark {
        stat,
        denominator,
        weight,
    }
}

const FORWARD: &[Benchmark] = &[
    bench(Stat::Goals, 20.0, 30.0),
    bench(Stat::Assists, 15.0, 25.0),
    bench(Stat::Dribbles, 40.0, 15.0),
    bench(Stat::KeyPasses, 40.0, 15.0),
    bench(Stat::Minutes, 3000.0, 15.0),
];

const MIDFIELDER: &[Benchmark] = &[
    bench(Stat::KeyPasses, 50.0, 25.0),
    bench(Stat::Assists, 10.0, 20.0),
    bench(Stat::Goals, 10.0, 15.0),
    bench(Stat::Dribbles, 40.0, 15.0),
    bench(Stat::Tackles, 50.0, 10.0),
    bench(Stat::Minutes, 3000.0, 15.0),
];

const DEFENDER: &[Benchmark] = &[
    bench(Stat::Tackles, 60.0, 25.0),
    bench(Stat::Interceptions, 50.0, 25.0),
    bench(Stat::Clearances, 100.0, 25.0),
    bench(Stat::Blocks, 30.0, 10.0),
    bench(Stat::Minutes, 3000.0, 15.0),
];

const GOALKEEPER: &[Benchmark] = &[
    bench(Stat::Minutes, 3000.0, 40.0),
    bench(Stat::Clearances, 30.0, 20.0),
    bench(Stat::Tackles, 10.0, 10.0),
    bench(Stat::Blocks, 20.0, 30.0),
];

const LEAGUES: &[(&str, f64)] = &[
    ("eng Premier League", 1.00),
    ("es La Liga", 0.98),
    ("de Bundesliga", 0.96),
    ("it Serie A", 0.95),
    ("fr Ligue 1", 0.93),
];

/// Bonus tiers on contribution per 90, highest threshold first.
const CONTRIBUTION_BONUS: &[(f64, f64)] = &[(1.2, 15.0), (0.9, 10.0), (0.6, 5.0)];

/// Age breakpoints (inclusive upper age, multiplier), youngest first.
const AGE_CURVE: &[(u32, f64)] = &[(20, 1.10), (23, 1.05)];

#[derive(Debug, Clone)]
pub struct ScoringTables {
    benchmarks: HashMap<Role, Vec<Benchmark>>,
    leagues: HashMap<String, f64>,
    unknown_league_weight: f64,
    contribution_bonus: Vec<(f64, f64)>,
    age_curve: Vec<(u32, f64)>,
}

impl ScoringTables {
    pub fn standard() -> &'static ScoringTables {
        STANDARD.get_or_init(ScoringTables::build_standard)
    }

    fn build_standard() -> Self {
        let benchmarks = HashMap::from([
            (Role::Forward, FORWARD.to_vec()),
            (Role::Midfielder, MIDFIELDER.to_vec()),
            (Role::Defender, DEFENDER.to_vec()),
            (Role::Goalkeeper, GOALKEEPER.to_vec()),
        ]);
        let leagues = LEAGUES
            .iter()
            .map(|(name, w)| (name.to_string(), *w))
            .collect();
        Self {
            benchmarks,
            leagues,
            unknown_league_weight: UNKNOWN_LEAGUE_WEIGHT,
            contribution_bonus: CONTRIBUTION_BONUS.to_vec(),
            age_curve: AGE_CURVE.to_vec(),
        }
    }

    pub fn benchmarks(&self, role: Role) -> &[Benchmark] {
        self.benchmarks.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn weight_total(&self, role: Role) -> f64 {
        self.benchmarks(role).iter().map(|b| b.weight).sum()
    }

    pub fn league_weight(&self, league: &str) -> f64 {
        self.leagues
            .get(league.trim())
            .copied()
            .unwrap_or(self.unknown_league_weight)
    }

    pub fn contribution_bonus(&self, rate: f64) -> f64 {
        self.contribution_bonus
            .iter()
            .find(|(threshold, _)| rate >= *threshold)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0.0)
    }

    pub fn age_multiplier(&self, age: u32) -> f64 {
        self.age_curve
            .iter()
            .find(|(max_age, _)| age <= *max_age)
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }
}
