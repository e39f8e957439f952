use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};

use ysp_scout::fake_dataset;
use ysp_scout::records::write_records_csv;

const DEFAULT_COUNT: usize = 500;
const DEFAULT_SEED: u64 = 2024;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let out = arg_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(ysp_scout::config::DEFAULT_DATA_PATH));
    let count = match arg_value(&args, "--count") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("--count expects a whole number, got '{raw}'"))?,
        None => DEFAULT_COUNT,
    };
    let seed = match arg_value(&args, "--seed") {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("--seed expects a whole number, got '{raw}'"))?,
        None => DEFAULT_SEED,
    };

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let records = fake_dataset::generate(count, seed);
    let file = File::create(&out).with_context(|| format!("create {}", out.display()))?;
    write_records_csv(file, &records).with_context(|| format!("write {}", out.display()))?;

    println!("Synthetic dataset written");
    println!("Path: {}", out.display());
    println!("Players: {count} (seed {seed})");
    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
