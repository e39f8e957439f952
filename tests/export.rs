use std::fs;
use std::path::PathBuf;

use ysp_scout::export::{SHORTLIST_HEADERS, export_xlsx, to_csv_string};
use ysp_scout::records::load_reader;
use ysp_scout::{FilterCriteria, Query, ScoringEngine, run_query};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn shortlist() -> ysp_scout::QueryOutcome {
    let records = load_reader(read_fixture("players_sample.csv").as_bytes()).unwrap();
    let query = Query::new(FilterCriteria::any().max_age(23)).with_valuation("Mateo Silva", "10m");
    run_query(&records, &query, &ScoringEngine::default())
}

#[test]
fn csv_has_header_and_one_line_per_row() {
    let outcome = shortlist();
    let raw = to_csv_string(&outcome.rows).unwrap();

    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, SHORTLIST_HEADERS);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), outcome.rows.len());
    assert_eq!(&rows[0][0], "Mateo Silva");
    assert_eq!(&rows[0][7], "89.60");
    assert_eq!(&rows[0][8], "linear");
    assert_eq!(&rows[0][9], "€10,000,000");
    assert_eq!(&rows[1][8], "");
}

#[test]
fn workbook_written_with_counts() {
    let outcome = shortlist();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shortlist.xlsx");
    let report = export_xlsx(&path, &outcome).unwrap();
    assert_eq!(report.rows, 3);
    assert_eq!(report.skipped, 1);
    assert!(fs::metadata(&path).unwrap().len() > 0);
}
