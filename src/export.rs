use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pipeline::{QueryOutcome, ScoredRow, SkippedRecord};
use crate::records::Stat;
use crate::valuation::format_euros;

pub struct ExportReport {
    pub rows: usize,
    pub skipped: usize,
}

pub const SHORTLIST_HEADERS: [&str; 14] = [
    "Player",
    "Age",
    "Position",
    "League",
    "Club",
    "Minutes",
    "Contribution/90",
    "YSP",
    "Formula",
    "Current Value",
    "Future Value",
    "ROI",
    "Valuation Warning",
    "Transfermarkt",
];

pub fn shortlist_row(row: &ScoredRow) -> Vec<String> {
    let record = &row.record;
    let (formula, current, future, roi, warning) = match &row.valuation {
        Some(Ok(v)) => (
            v.formula.name(),
            format_euros(v.current_value),
            v.future_value.map(format_euros).unwrap_or_default(),
            v.roi.to_string(),
            String::new(),
        ),
        Some(Err(err)) => (
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            err.to_string(),
        ),
        None => Default::default(),
    };
    vec![
        record.name.clone(),
        record.age.to_string(),
        record.position.clone(),
        record.league.clone(),
        record.club.clone().unwrap_or_default(),
        opt_to_string(record.stat(Stat::Minutes)),
        format!("{:.2}", row.score.contribution_per90),
        format!("{:.2}", row.score.score),
        formula,
        current,
        future,
        roi,
        warning,
        row.lookup_url.clone(),
    ]
}

fn skipped_row(skipped: &SkippedRecord) -> Vec<String> {
    vec![skipped.name.clone(), skipped.error.to_string()]
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_csv<W: Write>(writer: W, rows: &[ScoredRow]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(SHORTLIST_HEADERS)
        .context("write csv header")?;
    for row in rows {
        out.write_record(shortlist_row(row))
            .with_context(|| format!("write csv row for {}", row.record.name))?;
    }
    out.flush().context("flush csv")?;
    Ok(())
}

pub fn to_csv_string(rows: &[ScoredRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    String::from_utf8(buf).context("csv output is not utf-8")
}

pub fn export_xlsx(path: &Path, outcome: &QueryOutcome) -> Result<ExportReport> {
    let mut shortlist_rows: Vec<Vec<String>> = vec![SHORTLIST_HEADERS.iter().map(|h| h.to_string()).collect()];
    shortlist_rows.extend(outcome.rows.iter().map(shortlist_row));

    let mut skipped_rows: Vec<Vec<String>> = vec![vec!["Player".to_string(), "Reason".to_string()]];
    skipped_rows.extend(outcome.skipped.iter().map(skipped_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Shortlist")?;
        write_rows(sheet, &shortlist_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Skipped")?;
        write_rows(sheet, &skipped_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: shortlist_rows.len().saturating_sub(1),
        skipped: skipped_rows.len().saturating_sub(1),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
