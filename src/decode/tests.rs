//! Tests for decoder module

use super::*;
use crate::error::Error;
use crate::types::ColumnDelimiter;
use serde_json::json;

#[test]
fn test_csv_decode_with_header() {
    let body = "Id,Name,Amount\n001A,Acme,100\n001B,Globex,250\n";
    let records = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Id"], json!("001A"));
    assert_eq!(records[1]["Name"], json!("Globex"));
    // No type inference: numbers stay strings
    assert_eq!(records[0]["Amount"], json!("100"));
}

#[test]
fn test_csv_decode_preserves_column_order() {
    let body = "Zeta,Alpha,Mid\n1,2,3\n";
    let records = CsvDecoder::new().decode(body).unwrap();
    let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_csv_decode_quoted_fields() {
    let body = "Id,Description\n1,\"Line one\nLine two, with comma\"\n2,\"He said \"\"hi\"\"\"\n";
    let records = CsvDecoder::new().decode(body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0]["Description"],
        json!("Line one\nLine two, with comma")
    );
    assert_eq!(records[1]["Description"], json!("He said \"hi\""));
}

#[test]
fn test_csv_decode_empty_values() {
    let body = "Id,Phone\n1,\n";
    let records = CsvDecoder::new().decode(body).unwrap();
    assert_eq!(records[0]["Phone"], json!(""));
}

#[test]
fn test_csv_decode_header_only() {
    let records = CsvDecoder::new().decode("Id,Name\n").unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_csv_decode_empty_body() {
    let records = CsvDecoder::new().decode("").unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_csv_decode_strips_bom() {
    let records = CsvDecoder::new().decode("\u{feff}Id\n1\n").unwrap();
    assert_eq!(records[0]["Id"], json!("1"));
}

#[test]
fn test_csv_decode_crlf() {
    let records = CsvDecoder::new().decode("Id,Name\r\n1,A\r\n").unwrap();
    assert_eq!(records[0]["Name"], json!("A"));
}

#[test]
fn test_csv_decode_ragged_row_fails() {
    let body = "Id,Name\n1,Acme,extra\n";
    let err = CsvDecoder::new().decode(body).unwrap_err();
    assert!(matches!(err, Error::CsvParse { .. }));
}

#[test]
fn test_csv_decode_custom_delimiter() {
    let decoder = CsvDecoder::with_delimiter(ColumnDelimiter::Pipe);
    assert_eq!(decoder.delimiter(), b'|');

    let records = decoder.decode("Id|Name\n1|Acme, Inc\n").unwrap();
    assert_eq!(records[0]["Name"], json!("Acme, Inc"));
}
