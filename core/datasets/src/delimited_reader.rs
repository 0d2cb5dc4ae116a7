// FILENAME: core/datasets/src/delimited_reader.rs
// PURPOSE: Reads header-delimited text datasets (.csv, .txt) as a single table.
// CONTEXT: The table is named after the file stem; the header row names the columns.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use profile_engine::{RawRow, Value};

use crate::{ColumnInfo, DatasetError};

/// Parses one field: empty is NULL, then integer, then finite float, else text.
/// Words `f64` would also accept ("nan", "inf", "Infinity") stay text.
pub(crate) fn parse_field(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Value::Integer(value);
    }
    if let Some(value) = trimmed.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Value::Float(value);
    }
    Value::Text(trimmed.to_owned())
}

/// Decodes raw field bytes, replacing invalid UTF-8 rather than failing.
fn decode(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// `.txt` files are tab-separated when the header line contains a tab.
fn detect_delimiter(path: &Path) -> Result<u8, DatasetError> {
    let is_txt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Ok(b',');
    }

    let mut header = Vec::new();
    BufReader::new(File::open(path)?).read_until(b'\n', &mut header)?;
    Ok(if header.contains(&b'\t') { b'\t' } else { b',' })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, DatasetError> {
    let delimiter = detect_delimiter(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?)
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn check_table(path: &Path, table: &str) -> Result<(), DatasetError> {
    if table_name(path) == table {
        Ok(())
    } else {
        Err(DatasetError::UnknownTable(table.to_string()))
    }
}

/// Header names, trimmed and lossily decoded.
fn read_headers(reader: &mut csv::Reader<File>) -> Result<Vec<String>, DatasetError> {
    Ok(reader
        .byte_headers()?
        .iter()
        .map(|h| decode(h).trim().to_string())
        .collect())
}

fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

fn field_at(record: &ByteRecord, index: Option<usize>) -> Value {
    index
        .and_then(|i| record.get(i))
        .map_or(Value::Null, |field| parse_field(&decode(field)))
}

// ============================================================================
// TYPE INFERENCE
// ============================================================================

/// Widest value type seen in a column, reported as a SQLite-style affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Affinity {
    Unknown,
    Integer,
    Real,
    Text,
}

impl Affinity {
    fn widen(self, value: &Value) -> Self {
        let seen = match value {
            Value::Null => Affinity::Unknown,
            Value::Integer(_) => Affinity::Integer,
            Value::Float(_) => Affinity::Real,
            Value::Text(_) => Affinity::Text,
        };
        self.max(seen)
    }

    fn as_str(self) -> &'static str {
        match self {
            Affinity::Unknown => "",
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn list_tables(path: &Path) -> Result<Vec<String>, DatasetError> {
    Ok(vec![table_name(path)])
}

pub fn table_columns(path: &Path, table: &str) -> Result<Vec<ColumnInfo>, DatasetError> {
    check_table(path, table)?;
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;

    let mut affinities = vec![Affinity::Unknown; headers.len()];
    for record in reader.byte_records() {
        let record = record?;
        for (i, affinity) in affinities.iter_mut().enumerate() {
            *affinity = affinity.widen(&field_at(&record, Some(i)));
        }
    }

    Ok(headers
        .into_iter()
        .zip(affinities)
        .enumerate()
        .map(|(cid, (name, affinity))| ColumnInfo {
            cid: cid as i64,
            name,
            declared_type: affinity.as_str().to_string(),
            notnull: false,
            default: None,
            pk: false,
        })
        .collect())
}

pub fn fetch_pairs(
    path: &Path,
    table: &str,
    column: &str,
    secondary: &str,
) -> Result<Vec<RawRow>, DatasetError> {
    check_table(path, table)?;
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;

    let primary_index = find_header(&headers, column)
        .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;
    let secondary_index = find_header(&headers, secondary);
    if secondary_index.is_none() {
        log::debug!("{} has no column {}, secondary is NULL", table, secondary);
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(RawRow {
            primary: field_at(&record, Some(primary_index)),
            secondary: field_at(&record, secondary_index),
        });
    }

    log::debug!("fetched {} rows from {}.{}", rows.len(), table, column);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field(""), Value::Null);
        assert_eq!(parse_field("  "), Value::Null);
        assert_eq!(parse_field("42"), Value::Integer(42));
        assert_eq!(parse_field(" 2.5 "), Value::Float(2.5));
        assert_eq!(parse_field("Oslo"), Value::from("Oslo"));
    }

    #[test]
    fn test_float_words_stay_text() {
        assert_eq!(parse_field("Nan"), Value::from("Nan"));
        assert_eq!(parse_field("inf"), Value::from("inf"));
        assert_eq!(parse_field("-Infinity"), Value::from("-Infinity"));
        assert_eq!(parse_field("1e3"), Value::Float(1000.0));
        assert_eq!(parse_field("1e999"), Value::from("1e999"));
    }

    #[test]
    fn test_float_word_names_group_as_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "people.csv", "name,age\nNan,30\nInf,40\nann,50\n");

        let rows = fetch_pairs(&path, "people", "name", "age").unwrap();

        assert_eq!(
            rows,
            vec![
                RawRow::new("Nan", 30i64),
                RawRow::new("Inf", 40i64),
                RawRow::new("ann", 50i64),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, b"na\xffme,age\nann,30\nb\xffb,40\n").unwrap();

        let columns = table_columns(&path, "people").unwrap();
        assert_eq!(columns[0].name, "na\u{fffd}me");
        assert_eq!(columns[1].declared_type, "INTEGER");

        let rows = fetch_pairs(&path, "people", "na\u{fffd}me", "age").unwrap();
        assert_eq!(
            rows,
            vec![
                RawRow::new("ann", 30i64),
                RawRow::new("b\u{fffd}b", 40i64),
            ]
        );
    }

    #[test]
    fn test_csv_columns_and_types() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "people.csv", "name,age,score\nann,30,1\nbob,,2.5\n");

        assert_eq!(list_tables(&path).unwrap(), vec!["people".to_string()]);

        let columns = table_columns(&path, "people").unwrap();
        let summary: Vec<(&str, &str)> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.declared_type.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("name", "TEXT"), ("age", "INTEGER"), ("score", "REAL")]
        );
    }

    #[test]
    fn test_tab_separated_txt() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "survey.txt", "city\tage\nOslo\t30\nRome\t\n");

        let rows = fetch_pairs(&path, "survey", "city", "age").unwrap();

        assert_eq!(
            rows,
            vec![
                RawRow::new("Oslo", 30i64),
                RawRow::new("Rome", Value::Null),
            ]
        );
    }

    #[test]
    fn test_short_rows_and_missing_secondary() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", "a,b\n1,2\n3\n");

        let rows = fetch_pairs(&path, "t", "b", "age").unwrap();

        assert_eq!(
            rows,
            vec![
                RawRow::new(2i64, Value::Null),
                RawRow::new(Value::Null, Value::Null),
            ]
        );
    }

    #[test]
    fn test_unknown_table_and_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", "a,b\n1,2\n");

        assert!(matches!(
            fetch_pairs(&path, "other", "a", "b"),
            Err(DatasetError::UnknownTable(_))
        ));
        assert!(matches!(
            fetch_pairs(&path, "t", "zzz", "b"),
            Err(DatasetError::UnknownColumn(_))
        ));
    }
}
