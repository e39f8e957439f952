use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use log::warn;

use ysp_scout::config::{self, ScoutConfig};
use ysp_scout::export;
use ysp_scout::pipeline::{Query, QueryOutcome, SortOrder, run_query};
use ysp_scout::record_cache::RecordCache;
use ysp_scout::records::{LoadOptions, Stat};
use ysp_scout::valuation::{ProjectionFormula, format_euros};
use ysp_scout::{FilterCriteria, PositionFilter, ScoringEngine, ScoringTables};

const USAGE: &str = "\
usage: ysp_scout [--data <csv>] [filters] [valuation] [output]

filters:
  --max-age <n>  --min-age <n>  --position <GK|DF|MF|FW|any>  --league <name>
  --min-minutes <n>  --min-contrib <per90>  --min-xg90 <per90>
  --min-stat <stat>=<n>          repeatable, e.g. --min-stat tackles=40

valuation:
  --value \"<player>=<value>\"     repeatable, e.g. --value \"Jan Novak=10m\"
  --formula <linear|ceiling-50m|ceiling-80m|ceiling-100m|ratio|xg-growth>

output:
  --sort score  --limit <n>  --csv <path>  --xlsx <path>  --json
  --lenient-positions            keep rows whose position is not GK/DF/MF/FW
";

#[derive(Debug, Default)]
struct CliArgs {
    data: Option<PathBuf>,
    max_age: Option<u32>,
    min_age: Option<u32>,
    position: Option<String>,
    league: Option<String>,
    min_minutes: Option<f64>,
    min_contrib: Option<f64>,
    min_xg90: Option<f64>,
    min_stats: Vec<(Stat, f64)>,
    values: Vec<(String, String)>,
    formula: Option<ProjectionFormula>,
    sort_by_score: bool,
    limit: Option<usize>,
    csv: Option<PathBuf>,
    xlsx: Option<PathBuf>,
    json: bool,
    lenient_positions: bool,
    help: bool,
}

fn main() -> Result<()> {
    config::load_env_files();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ScoutConfig::from_env();

    let args = parse_args(std::env::args().skip(1).collect())?;
    if args.help {
        print!("{USAGE}");
        return Ok(());
    }

    if let Some(threads) = config.threads
        && let Err(err) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        warn!("could not size scoring pool to {threads} threads: {err}");
    }

    let data_path = args.data.clone().unwrap_or_else(|| config.data_path.clone());
    let cache = RecordCache::new(LoadOptions {
        strict_positions: !args.lenient_positions,
        ..LoadOptions::default()
    });
    let records = cache
        .get_or_load(&data_path)
        .with_context(|| format!("unable to load player data from {}", data_path.display()))?;

    let query = build_query(&args, &config);
    let engine = ScoringEngine::new(ScoringTables::standard());
    let outcome = run_query(&records, &query, &engine);

    if args.json {
        print_json(&query, &outcome)?;
    } else {
        print_table(&outcome, records.len());
    }

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        export::write_csv(file, &outcome.rows)?;
        println!("CSV written: {}", path.display());
    }
    if let Some(path) = &args.xlsx {
        let report = export::export_xlsx(path, &outcome)?;
        println!(
            "Workbook written: {} ({} rows, {} skipped)",
            path.display(),
            report.rows,
            report.skipped
        );
    }

    Ok(())
}

fn build_query(args: &CliArgs, config: &ScoutConfig) -> Query {
    let mut criteria = FilterCriteria::any().min_minutes(args.min_minutes.unwrap_or(config.min_minutes));
    if let Some(age) = args.max_age {
        criteria = criteria.max_age(age);
    }
    if let Some(age) = args.min_age {
        criteria = criteria.min_age(age);
    }
    if let Some(position) = &args.position {
        criteria = criteria.position(PositionFilter::parse(position));
    }
    if let Some(league) = &args.league {
        criteria = criteria.league(league.clone());
    }
    if let Some(rate) = args.min_contrib {
        criteria = criteria.min_contribution_per90(rate);
    }
    if let Some(rate) = args.min_xg90 {
        criteria = criteria.min_xg_per90(rate);
    }
    for (stat, min) in &args.min_stats {
        criteria = criteria.min_stat(*stat, *min);
    }

    let mut query = Query::new(criteria).with_formula(args.formula.unwrap_or(config.formula));
    for (player, text) in &args.values {
        query = query.with_valuation(player.clone(), text.clone());
    }
    if args.sort_by_score {
        query = query.sorted(SortOrder::ScoreDesc);
    }
    if let Some(limit) = args.limit.or(config.limit) {
        query = query.limit(limit);
    }
    query
}

fn print_table(outcome: &QueryOutcome, total: usize) {
    println!("Players matching: {} of {}", outcome.rows.len(), total);
    println!(
        "{:<4} {:<28} {:>3} {:<7} {:<20} {:>7} {:>6}  Valuation",
        "#", "Player", "Age", "Pos", "League", "C/90", "YSP"
    );
    for (idx, row) in outcome.rows.iter().enumerate() {
        let valuation = match &row.valuation {
            Some(Ok(v)) => match v.future_value {
                Some(future) => format!("future {} | ROI {}", format_euros(future), v.roi),
                None => format!("ROI {}", v.roi),
            },
            Some(Err(err)) => format!("! {err}"),
            None => String::new(),
        };
        println!(
            "{:<4} {:<28} {:>3} {:<7} {:<20} {:>7.2} {:>6.2}  {}",
            idx + 1,
            truncate(&row.record.name, 28),
            row.record.age,
            row.record.position,
            truncate(&row.record.league, 20),
            row.score.contribution_per90,
            row.score.score,
            valuation
        );
    }
    if !outcome.skipped.is_empty() {
        println!("Skipped (unscorable): {}", outcome.skipped.len());
        for skipped in outcome.skipped.iter().take(8) {
            println!(" - {}", skipped.error);
        }
    }
}

fn print_json(query: &Query, outcome: &QueryOutcome) -> Result<()> {
    let report = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "criteria": query.criteria,
        "formula": query.formula,
        "rows": outcome.rows,
        "skipped": outcome.skipped,
    });
    let json = serde_json::to_string_pretty(&report).context("serialize query outcome")?;
    println!("{json}");
    Ok(())
}

fn truncate(raw: &str, width: usize) -> String {
    if raw.chars().count() <= width {
        raw.to_string()
    } else {
        let mut out: String = raw.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = || -> Result<String> {
            inline
                .clone()
                .or_else(|| iter.next())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{flag} needs a value"))
        };

        match flag.as_str() {
            "--help" | "-h" => out.help = true,
            "--json" => out.json = true,
            "--lenient-positions" => out.lenient_positions = true,
            "--data" => out.data = Some(PathBuf::from(value()?.trim())),
            "--max-age" => out.max_age = Some(parse_num(&flag, &value()?)?),
            "--min-age" => out.min_age = Some(parse_num(&flag, &value()?)?),
            "--position" => out.position = Some(value()?),
            "--league" => out.league = Some(value()?),
            "--min-minutes" => out.min_minutes = Some(parse_num(&flag, &value()?)?),
            "--min-contrib" => out.min_contrib = Some(parse_num(&flag, &value()?)?),
            "--min-xg90" => out.min_xg90 = Some(parse_num(&flag, &value()?)?),
            "--min-stat" => {
                let raw = value()?;
                let (stat, min) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--min-stat expects <stat>=<n>, got '{raw}'"))?;
                let stat: Stat = stat.parse().map_err(|err: String| anyhow!(err))?;
                out.min_stats.push((stat, parse_num(&flag, min)?));
            }
            "--value" => {
                let raw = value()?;
                let (player, text) = raw
                    .rsplit_once('=')
                    .ok_or_else(|| anyhow!("--value expects \"<player>=<value>\", got '{raw}'"))?;
                out.values.push((player.trim().to_string(), text.trim().to_string()));
            }
            "--formula" => {
                out.formula = Some(value()?.parse().map_err(|err: String| anyhow!(err))?)
            }
            "--sort" => match value()?.trim() {
                "score" => out.sort_by_score = true,
                "input" => out.sort_by_score = false,
                other => bail!("--sort expects score or input, got '{other}'"),
            },
            "--limit" => out.limit = Some(parse_num(&flag, &value()?)?),
            "--csv" => out.csv = Some(PathBuf::from(value()?.trim())),
            "--xlsx" => out.xlsx = Some(PathBuf::from(value()?.trim())),
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok(out)
}

fn parse_num<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("{flag} expects a number, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_inline_and_spaced_values() {
        let parsed = parse_args(args(&[
            "--max-age=21",
            "--position",
            "FW",
            "--min-stat",
            "tackles=40",
            "--value",
            "Jan Novak=10m",
            "--formula=ratio",
            "--sort",
            "score",
        ]))
        .unwrap();
        assert_eq!(parsed.max_age, Some(21));
        assert_eq!(parsed.position.as_deref(), Some("FW"));
        assert_eq!(parsed.min_stats, vec![(Stat::Tackles, 40.0)]);
        assert_eq!(parsed.values, vec![("Jan Novak".to_string(), "10m".to_string())]);
        assert_eq!(parsed.formula, Some(ProjectionFormula::RatioRoi));
        assert!(parsed.sort_by_score);
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--max-age"])).is_err());
        assert!(parse_args(args(&["--max-age", "old"])).is_err());
        assert!(parse_args(args(&["--min-stat", "shots=3"])).is_err());
    }

    #[test]
    fn query_defaults_come_from_config() {
        let config = ScoutConfig::default();
        let query = build_query(&CliArgs::default(), &config);
        assert_eq!(query.criteria.min_minutes, Some(300.0));
        assert_eq!(query.formula, ProjectionFormula::linear_to_cap());
        assert_eq!(query.sort, SortOrder::Input);
    }
}
