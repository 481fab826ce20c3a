//! Tests for output module

use super::*;
use crate::client::RetrievalResult;
use crate::error::Error;
use crate::types::Record;
use futures::stream::{self, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn read_text(path: &Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM), "{} has no BOM", path.display());
    String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap()
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let text = read_text(path);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

fn read_json_values(path: &Path) -> Vec<Value> {
    let text = read_text(path);
    serde_json::Deserializer::from_str(&text)
        .into_iter::<Value>()
        .map(Result::unwrap)
        .collect()
}

fn accounts() -> Vec<Record> {
    vec![
        record(json!({"Id": "001A", "Name": "Acme", "Employees": 50})),
        record(json!({"Id": "001B", "Name": "Globex", "Employees": null})),
        record(json!({"Id": "001C", "Name": "Initech", "Employees": 7})),
    ]
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_write_records_round_trip() {
    let dir = tempdir().unwrap();
    let records = accounts();

    let summary = write_records(&records, dir.path(), "accounts").unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.paths.json, dir.path().join("accounts.json"));
    assert_eq!(summary.paths.csv, dir.path().join("accounts.csv"));

    let (header, rows) = read_csv(&summary.paths.csv);
    assert_eq!(header, vec!["Id", "Name", "Employees"]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["001A", "Acme", "50"]);
    assert_eq!(rows[1], vec!["001B", "Globex", ""]);

    let values = read_json_values(&summary.paths.json);
    assert_eq!(values.len(), 3);
    assert_eq!(values[2], json!({"Id": "001C", "Name": "Initech", "Employees": 7}));
}

#[test]
fn test_json_is_pretty_and_newline_delimited() {
    let dir = tempdir().unwrap();
    let records = vec![record(json!({"Id": "1", "Name": "A"}))];

    let summary = write_records(&records, dir.path(), "out").unwrap();
    let text = read_text(&summary.paths.json);

    assert_eq!(text, "{\n    \"Id\": \"1\",\n    \"Name\": \"A\"\n}\n");
    assert!(!text.starts_with('['));
}

#[test]
fn test_csv_uses_crlf() {
    let dir = tempdir().unwrap();
    let records = vec![record(json!({"Id": "1"}))];

    let summary = write_records(&records, dir.path(), "out").unwrap();
    assert_eq!(read_text(&summary.paths.csv), "Id\r\n1\r\n");
}

#[test]
fn test_header_from_first_record_only() {
    let dir = tempdir().unwrap();
    let records = vec![
        record(json!({"Id": "1", "Name": "A"})),
        record(json!({"Id": "2", "Phone": "555"})),
        record(json!({"Name": "C", "Id": "3"})),
    ];

    let summary = write_records(&records, dir.path(), "mixed").unwrap();
    let (header, rows) = read_csv(&summary.paths.csv);

    assert_eq!(header, vec!["Id", "Name"]);
    assert_eq!(rows[1], vec!["2", ""]);
    assert_eq!(rows[2], vec!["3", "C"]);

    // JSON keeps every key
    let values = read_json_values(&summary.paths.json);
    assert_eq!(values[1]["Phone"], json!("555"));
}

#[test]
fn test_nested_values_rendered_as_json() {
    assert_eq!(csv_cell(Some(&json!({"city": "Oslo"}))), r#"{"city":"Oslo"}"#);
    assert_eq!(csv_cell(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    assert_eq!(csv_cell(Some(&json!(true))), "true");
    assert_eq!(csv_cell(Some(&json!(1.5))), "1.5");
    assert_eq!(csv_cell(Some(&Value::Null)), "");
    assert_eq!(csv_cell(None), "");
}

#[test]
fn test_rewrite_replaces_previous_output() {
    let dir = tempdir().unwrap();
    let records = accounts();

    let first = write_records(&records, dir.path(), "accounts").unwrap();
    let json_before = std::fs::read(&first.paths.json).unwrap();
    let csv_before = std::fs::read(&first.paths.csv).unwrap();

    let second = write_records(&records, dir.path(), "accounts").unwrap();
    assert_eq!(std::fs::read(&second.paths.json).unwrap(), json_before);
    assert_eq!(std::fs::read(&second.paths.csv).unwrap(), csv_before);

    let (_, rows) = read_csv(&second.paths.csv);
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_rewrite_when_only_one_file_exists() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("solo.csv"), "stale,data\r\n").unwrap();

    let records = vec![record(json!({"Id": "1"}))];
    let summary = write_records(&records, dir.path(), "solo").unwrap();

    assert_eq!(read_text(&summary.paths.csv), "Id\r\n1\r\n");
    assert_eq!(read_json_values(&summary.paths.json).len(), 1);
}

#[test]
fn test_creates_nested_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("results").join("Case").join("queries");

    write_records(&accounts(), &nested, "out").unwrap();
    assert!(nested.join("out.json").exists());

    // Existing directory is fine
    write_records(&accounts(), &nested, "out").unwrap();
}

#[test]
fn test_empty_records_create_empty_files() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("empty");

    let summary = write_records(&[], &out, "none").unwrap();
    assert_eq!(summary.records, 0);
    assert!(out.is_dir());
    assert_eq!(std::fs::read(&summary.paths.json).unwrap(), b"");
    assert_eq!(std::fs::read(&summary.paths.csv).unwrap(), b"");
}

#[test]
fn test_bom_written_once() {
    let dir = tempdir().unwrap();
    let records = vec![record(json!({"Id": "1"})), record(json!({"Id": "2"}))];

    let summary = write_records(&records, dir.path(), "two").unwrap();
    for path in [&summary.paths.json, &summary.paths.csv] {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert!(!bytes[UTF8_BOM.len()..].windows(UTF8_BOM.len()).any(|w| w == UTF8_BOM));
    }
}

#[test]
fn test_pair_writer_tracks_header() {
    let dir = tempdir().unwrap();
    let mut writer = PairWriter::create(dir.path(), "w").unwrap();
    assert!(writer.header().is_none());

    writer.write_record(&record(json!({"B": 1, "A": 2}))).unwrap();
    assert_eq!(writer.header().unwrap(), ["B", "A"]);
    assert_eq!(writer.records_written(), 1);

    let summary = writer.finish(0).unwrap();
    assert_eq!(summary.records, 1);
}

// ============================================================================
// Materializer Tests
// ============================================================================

#[tokio::test]
async fn test_materialize_records() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let summary = materializer
        .write(RetrievalResult::Records(accounts()), dir.path(), "acc")
        .await
        .unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.pages, 1);
}

#[tokio::test]
async fn test_materialize_pages_single_header() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let pages = RetrievalResult::from_pages(vec![
        "Id,Name\n1,Acme\n2,Globex\n".to_string(),
        "Id,Name\n3,Initech\n".to_string(),
    ]);

    let summary = materializer.write(pages, dir.path(), "paged").await.unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.pages, 2);

    let (header, rows) = read_csv(&summary.paths.csv);
    assert_eq!(header, vec!["Id", "Name"]);
    let ids: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let text = read_text(&summary.paths.csv);
    assert_eq!(text.matches("Id,Name").count(), 1);

    let values = read_json_values(&summary.paths.json);
    assert_eq!(values[2], json!({"Id": "3", "Name": "Initech"}));
}

#[tokio::test]
async fn test_materialize_pages_header_not_rederived() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let pages = RetrievalResult::from_pages(vec![
        "Id,Name\n1,Acme\n".to_string(),
        "Id,Phone\n2,555\n".to_string(),
    ]);

    let summary = materializer.write(pages, dir.path(), "drift").await.unwrap();
    let (header, rows) = read_csv(&summary.paths.csv);
    assert_eq!(header, vec!["Id", "Name"]);
    assert_eq!(rows[1], vec!["2", ""]);
}

#[tokio::test]
async fn test_materialize_empty_first_page() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let pages = RetrievalResult::from_pages(vec![
        "Id,Name\n".to_string(),
        "Id,Name\n1,Acme\n".to_string(),
    ]);

    let summary = materializer.write(pages, dir.path(), "p").await.unwrap();
    let (header, rows) = read_csv(&summary.paths.csv);
    assert_eq!(header, vec!["Id", "Name"]);
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_materialize_no_pages() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let summary = materializer
        .write(RetrievalResult::from_pages(Vec::new()), dir.path(), "none")
        .await
        .unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(summary.pages, 0);
    assert_eq!(std::fs::read(&summary.paths.csv).unwrap(), b"");
}

#[tokio::test]
async fn test_materialize_parse_failure_keeps_partial_output() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let pages = RetrievalResult::from_pages(vec![
        "Id,Name\n1,Acme\n".to_string(),
        "Id,Name\n2,Globex,extra\n".to_string(),
    ]);

    let err = materializer.write(pages, dir.path(), "partial").await.unwrap_err();
    assert!(matches!(err, Error::CsvParse { .. }));

    let (_, rows) = read_csv(&dir.path().join("partial.csv"));
    assert_eq!(rows, vec![vec!["1".to_string(), "Acme".to_string()]]);
}

#[tokio::test]
async fn test_materialize_stream_error_propagates() {
    let dir = tempdir().unwrap();
    let materializer = ResultMaterializer::new();

    let pages = stream::iter(vec![
        Ok("Id\n1\n".to_string()),
        Err(Error::http_status(500, "boom")),
    ])
    .boxed();

    let err = materializer
        .write(RetrievalResult::Pages(pages), dir.path(), "err")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(dir.path().join("err.json").exists());
}
