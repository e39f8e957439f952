use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::records::{PlayerRecord, Stat};

const FIRST_NAMES: &[&str] = &[
    "Luca", "Mateo", "Noah", "Kai", "Jonas", "Rafael", "Ilias", "Tomas", "Yusuf", "Adam",
    "Milan", "Elias",
];
const LAST_NAMES: &[&str] = &[
    "Silva", "Moreau", "Kovac", "Jensen", "Rossi", "Okafor", "Novak", "Haddad", "Berg",
    "Costa", "Weber", "Lindqvist",
];
const LEAGUES: &[&str] = &[
    "eng Premier League",
    "es La Liga",
    "de Bundesliga",
    "it Serie A",
    "fr Ligue 1",
    "nl Eredivisie",
    "pt Primeira Liga",
];
const CLUBS: &[&str] = &[
    "Northbridge", "Sporting Vale", "Real Costa", "Union Berg", "Atletico Norte", "Rapid Ost",
];
const POSITIONS: &[&str] = &["GK", "DF", "DF", "MF", "MF", "FW", "FW", "MF,FW", "DF,MF"];

pub fn generate(count: usize, seed: u64) -> Vec<PlayerRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|idx| synth_record(&mut rng, idx)).collect()
}

fn synth_record(rng: &mut StdRng, idx: usize) -> PlayerRecord {
    let name = format!(
        "{} {} {}",
        FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
        LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())],
        idx + 1
    );
    let position = POSITIONS[rng.gen_range(0..POSITIONS.len())];
    let league = LEAGUES[rng.gen_range(0..LEAGUES.len())];
    let club = CLUBS[rng.gen_range(0..CLUBS.len())];
    let age = rng.gen_range(16..=36);
    let minutes = rng.gen_range(0..=3400) as f64;
    let share = minutes / 3000.0;

    let attacking = position.contains("FW") || position.contains("MF");
    let defending = position.contains("DF") || position == "GK";

    let mut scaled = |lo: f64, hi: f64| (rng.gen_range(lo..=hi) * share).round();
    let goals = if attacking { scaled(0.0, 22.0) } else { scaled(0.0, 3.0) };
    let assists = if attacking { scaled(0.0, 14.0) } else { scaled(0.0, 4.0) };
    let dribbles = if attacking { scaled(5.0, 60.0) } else { scaled(0.0, 10.0) };
    let key_passes = if attacking { scaled(5.0, 70.0) } else { scaled(0.0, 15.0) };
    let tackles = if defending { scaled(10.0, 80.0) } else { scaled(5.0, 40.0) };
    let interceptions = if defending { scaled(10.0, 60.0) } else { scaled(2.0, 25.0) };
    let clearances = if defending { scaled(20.0, 140.0) } else { scaled(0.0, 20.0) };
    let blocks = if defending { scaled(5.0, 35.0) } else { scaled(0.0, 10.0) };

    let mut record = PlayerRecord::new(name, age, position, league)
        .with_club(club)
        .with_stat(Stat::Minutes, minutes)
        .with_stat(Stat::Goals, goals)
        .with_stat(Stat::Assists, assists)
        .with_stat(Stat::Dribbles, dribbles)
        .with_stat(Stat::KeyPasses, key_passes)
        .with_stat(Stat::Tackles, tackles)
        .with_stat(Stat::Interceptions, interceptions)
        .with_stat(Stat::Clearances, clearances)
        .with_stat(Stat::Blocks, blocks);

    // Some sources have no expected-goals coverage.
    if rng.gen_bool(0.8) {
        let xg = (goals * rng.gen_range(0.7..1.3) * 10.0).round() / 10.0;
        let xag = (assists * rng.gen_range(0.7..1.3) * 10.0).round() / 10.0;
        record = record
            .with_stat(Stat::ExpectedGoals, xg)
            .with_stat(Stat::ExpectedAssists, xag);
    }
    record
}
