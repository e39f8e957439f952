use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{DataFormatError, DataIntegrityError, LoadError};

pub const MIN_PLAUSIBLE_AGE: u32 = 14;
pub const MAX_PLAUSIBLE_AGE: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Minutes,
    Goals,
    Assists,
    Dribbles,
    KeyPasses,
    Tackles,
    Interceptions,
    Clearances,
    Blocks,
    ExpectedGoals,
    ExpectedAssists,
}

impl Stat {
    pub const ALL: [Stat; 11] = [
        Stat::Minutes,
        Stat::Goals,
        Stat::Assists,
        Stat::Dribbles,
        Stat::KeyPasses,
        Stat::Tackles,
        Stat::Interceptions,
        Stat::Clearances,
        Stat::Blocks,
        Stat::ExpectedGoals,
        Stat::ExpectedAssists,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Minutes => "minutes",
            Stat::Goals => "goals",
            Stat::Assists => "assists",
            Stat::Dribbles => "dribbles",
            Stat::KeyPasses => "key_passes",
            Stat::Tackles => "tackles",
            Stat::Interceptions => "interceptions",
            Stat::Clearances => "clearances",
            Stat::Blocks => "blocks",
            Stat::ExpectedGoals => "xg",
            Stat::ExpectedAssists => "xag",
        }
    }

    fn header_aliases(self) -> &'static [&'static str] {
        match self {
            Stat::Minutes => &["min", "minutes", "minutes_played", "mins"],
            Stat::Goals => &["gls", "goals"],
            Stat::Assists => &["ast", "assists"],
            Stat::Dribbles => &["succ", "successful_dribbles", "dribbles", "drib"],
            Stat::KeyPasses => &["kp", "key_passes"],
            Stat::Tackles => &["tkl", "tackles"],
            Stat::Interceptions => &["int", "interceptions"],
            Stat::Clearances => &["clr", "clearances"],
            Stat::Blocks => &["blocks", "blk"],
            Stat::ExpectedGoals => &["xg", "expected_goals"],
            Stat::ExpectedAssists => &["xag", "xa", "expected_assists"],
        }
    }

    fn required(self) -> bool {
        matches!(self, Stat::Minutes | Stat::Goals | Stat::Assists)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = normalize_header(raw);
        Stat::ALL
            .into_iter()
            .find(|stat| stat.label() == key || stat.header_aliases().contains(&key.as_str()))
            .ok_or_else(|| format!("unknown stat '{raw}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    /// Order in which a composite label ("MF,FW") picks its benchmark table.
    pub const PRIORITY: [Role; 4] = [
        Role::Forward,
        Role::Midfielder,
        Role::Defender,
        Role::Goalkeeper,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DF",
            Role::Midfielder => "MF",
            Role::Forward => "FW",
        }
    }

    pub fn from_code(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GK" => Some(Role::Goalkeeper),
            "DF" => Some(Role::Defender),
            "MF" => Some(Role::Midfielder),
            "FW" => Some(Role::Forward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub age: u32,
    pub position: String,
    pub league: String,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
}

impl PlayerRecord {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        position: impl Into<String>,
        league: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            position: position.into(),
            league: league.into(),
            club: None,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, stat: Stat, value: f64) -> Self {
        self.stats.insert(stat, value);
        self
    }

    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }

    pub fn stat(&self, stat: Stat) -> Option<f64> {
        self.stats.get(&stat).copied()
    }

    pub fn minutes(&self) -> Option<f64> {
        self.stat(Stat::Minutes)
    }

    pub fn plays(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty() && self.position.contains(code)
    }

    pub fn primary_role(&self) -> Option<Role> {
        Role::PRIORITY
            .into_iter()
            .find(|role| self.position.contains(role.code()))
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub strict_positions: bool,
    pub min_age: u32,
    pub max_age: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict_positions: true,
            min_age: MIN_PLAUSIBLE_AGE,
            max_age: MAX_PLAUSIBLE_AGE,
        }
    }
}

pub fn load_path(path: &Path) -> Result<Vec<PlayerRecord>, LoadError> {
    load_path_with(path, &LoadOptions::default())
}

pub fn load_path_with(path: &Path, options: &LoadOptions) -> Result<Vec<PlayerRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = load_reader_with(file, options)?;
    info!("loaded {} player records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRecord>, LoadError> {
    load_reader_with(rdr, &LoadOptions::default())
}

pub fn load_reader_with<R: Read>(rdr: R, options: &LoadOptions) -> Result<Vec<PlayerRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(rdr);
    let headers = reader.headers().map_err(DataFormatError::from)?.clone();
    let columns = ColumnMap::resolve(&headers)?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(DataFormatError::from)?;
        out.push(columns.bind(row, &raw, options)?);
    }
    Ok(out)
}

pub fn write_records_csv<W: Write>(writer: W, records: &[PlayerRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec!["Player", "Age", "Pos", "Comp", "Squad"];
    header.extend(Stat::ALL.iter().map(|s| s.header_aliases()[0]));
    out.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.name.clone(),
            record.age.to_string(),
            record.position.clone(),
            record.league.clone(),
            record.club.clone().unwrap_or_default(),
        ];
        row.extend(
            Stat::ALL
                .iter()
                .map(|s| record.stat(*s).map(|v| v.to_string()).unwrap_or_default()),
        );
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

const NAME_ALIASES: &[&str] = &["player", "name", "player_name"];
const AGE_ALIASES: &[&str] = &["age"];
const POSITION_ALIASES: &[&str] = &["pos", "position"];
const LEAGUE_ALIASES: &[&str] = &["comp", "league", "competition"];
const CLUB_ALIASES: &[&str] = &["squad", "club", "team"];

struct ColumnMap {
    name: usize,
    age: usize,
    position: usize,
    league: usize,
    club: Option<usize>,
    stats: Vec<(Stat, usize)>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, DataFormatError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |aliases: &[&str]| normalized.iter().position(|h| aliases.contains(&h.as_str()));
        let require = |aliases: &[&str], column: &'static str| {
            find(aliases).ok_or(DataFormatError::MissingColumn(column))
        };

        let mut stats = Vec::new();
        for stat in Stat::ALL {
            match find(stat.header_aliases()) {
                Some(idx) => stats.push((stat, idx)),
                None if stat.required() => return Err(DataFormatError::MissingColumn(stat.label())),
                None => {}
            }
        }

        Ok(Self {
            name: require(NAME_ALIASES, "player")?,
            age: require(AGE_ALIASES, "age")?,
            position: require(POSITION_ALIASES, "position")?,
            league: require(LEAGUE_ALIASES, "league")?,
            club: find(CLUB_ALIASES),
            stats,
        })
    }

    fn bind(
        &self,
        row: usize,
        raw: &csv::StringRecord,
        options: &LoadOptions,
    ) -> Result<PlayerRecord, LoadError> {
        let cell = |idx: usize| raw.get(idx).unwrap_or("").trim();

        let name = cell(self.name);
        if name.is_empty() {
            return Err(DataFormatError::BlankCell { row, column: "player" }.into());
        }

        let age = parse_age(row, cell(self.age))?;
        if age < options.min_age || age > options.max_age {
            return Err(DataIntegrityError::ImplausibleAge {
                row,
                age,
                min: options.min_age,
                max: options.max_age,
            }
            .into());
        }

        let position = normalize_position(row, cell(self.position), options.strict_positions)?;

        let mut stats = BTreeMap::new();
        for (stat, idx) in &self.stats {
            if let Some(value) = parse_number(row, stat.label(), cell(*idx))? {
                stats.insert(*stat, value);
            }
        }

        let club = self
            .club
            .map(cell)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(PlayerRecord {
            name: name.to_string(),
            age,
            position,
            league: cell(self.league).to_string(),
            club,
            stats,
        })
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Accepts plain integers and the `years-days` form ("21-140").
fn parse_age(row: usize, raw: &str) -> Result<u32, DataFormatError> {
    if raw.is_empty() {
        return Err(DataFormatError::BlankCell { row, column: "age" });
    }
    let years = raw.split('-').next().unwrap_or(raw).trim();
    if let Ok(age) = years.parse::<u32>() {
        return Ok(age);
    }
    match years.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as u32),
        _ => Err(DataFormatError::Unparsable {
            row,
            column: "age",
            value: raw.to_string(),
        }),
    }
}

fn parse_number(row: usize, column: &'static str, raw: &str) -> Result<Option<f64>, DataFormatError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let cleaned = raw.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(DataFormatError::Unparsable {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

/// Uppercases role tokens and joins them with ",". Strict mode rejects any token that
/// is not GK/DF/MF/FW; lenient mode keeps such tokens as given.
fn normalize_position(row: usize, raw: &str, strict: bool) -> Result<String, DataIntegrityError> {
    let tokens: Vec<&str> = raw
        .split([',', '/'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    let roles: Option<Vec<Role>> = tokens.iter().map(|t| Role::from_code(t)).collect();

    match roles {
        Some(roles) if !roles.is_empty() => Ok(roles
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(",")),
        _ if !strict && !tokens.is_empty() => Ok(tokens
            .iter()
            .map(|t| match Role::from_code(t) {
                Some(role) => role.code().to_string(),
                None => t.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")),
        _ => Err(DataIntegrityError::UnrecognizedPosition {
            row,
            label: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_label_prefers_forward_table() {
        let rec = PlayerRecord::new("A", 20, "DF,MF,FW", "x");
        assert_eq!(rec.primary_role(), Some(Role::Forward));
        let rec = PlayerRecord::new("B", 20, "DF,MF", "x");
        assert_eq!(rec.primary_role(), Some(Role::Midfielder));
        let rec = PlayerRecord::new("C", 20, "WB", "x");
        assert_eq!(rec.primary_role(), None);
    }

    #[test]
    fn position_tokens_are_normalized() {
        assert_eq!(normalize_position(1, "mf, fw", true).unwrap(), "MF,FW");
        assert_eq!(normalize_position(1, "DF/MF", true).unwrap(), "DF,MF");
        assert!(normalize_position(1, "", true).is_err());
        assert!(normalize_position(1, "MF,WB", true).is_err());
        assert_eq!(normalize_position(1, "WB", false).unwrap(), "WB");
        assert_eq!(normalize_position(1, "fw/wb", false).unwrap(), "FW,wb");
        assert!(normalize_position(1, " ", false).is_err());
    }

    #[test]
    fn age_accepts_years_days_form() {
        assert_eq!(parse_age(1, "21-140").unwrap(), 21);
        assert_eq!(parse_age(1, "19").unwrap(), 19);
        assert_eq!(parse_age(1, "23.0").unwrap(), 23);
        assert!(parse_age(1, "twenty").is_err());
        assert!(matches!(
            parse_age(3, ""),
            Err(DataFormatError::BlankCell { row: 3, column: "age" })
        ));
    }

    #[test]
    fn numbers_strip_thousands_separators() {
        assert_eq!(parse_number(1, "minutes", "1,234").unwrap(), Some(1234.0));
        assert_eq!(parse_number(1, "minutes", "").unwrap(), None);
        assert!(parse_number(1, "minutes", "n/a").is_err());
        assert!(parse_number(1, "minutes", "NaN").is_err());
    }

    #[test]
    fn stat_names_parse_from_labels_and_headers() {
        assert_eq!("key_passes".parse::<Stat>().unwrap(), Stat::KeyPasses);
        assert_eq!("KP".parse::<Stat>().unwrap(), Stat::KeyPasses);
        assert_eq!("Tkl".parse::<Stat>().unwrap(), Stat::Tackles);
        assert!("shots".parse::<Stat>().is_err());
    }
}
