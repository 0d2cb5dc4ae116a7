// FILENAME: core/datasets/src/sqlite_reader.rs
// PURPOSE: Reads SQLite database datasets: catalog listing and pair fetching.
// CONTEXT: User-typed table and column names are matched against the catalog;
//          only catalog spellings are quoted into SQL text.

use std::path::Path;

use profile_engine::{RawRow, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::{ColumnInfo, DatasetError};

fn open(path: &Path) -> Result<Connection, DatasetError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

/// Wraps an identifier in double quotes, doubling embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn value_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
    }
}

fn query_tables(conn: &Connection) -> Result<Vec<String>, DatasetError> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Resolves a user-supplied table name against the catalog.
/// Returns the catalog spelling, so nothing user-typed reaches the SQL text.
fn resolve_table(conn: &Connection, table: &str) -> Result<String, DatasetError> {
    let tables = query_tables(conn)?;
    tables
        .iter()
        .find(|t| t.as_str() == table)
        .or_else(|| tables.iter().find(|t| t.eq_ignore_ascii_case(table)))
        .cloned()
        .ok_or_else(|| DatasetError::UnknownTable(table.to_string()))
}

fn query_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, DatasetError> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                cid: row.get(0)?,
                name: row.get(1)?,
                declared_type: row.get(2)?,
                notnull: row.get::<_, i64>(3)? != 0,
                default: row.get(4)?,
                pk: row.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn find_column<'a>(columns: &'a [ColumnInfo], name: &str) -> Option<&'a ColumnInfo> {
    columns
        .iter()
        .find(|c| c.name == name)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
}

pub fn list_tables(path: &Path) -> Result<Vec<String>, DatasetError> {
    let conn = open(path)?;
    query_tables(&conn)
}

pub fn table_columns(path: &Path, table: &str) -> Result<Vec<ColumnInfo>, DatasetError> {
    let conn = open(path)?;
    let table = resolve_table(&conn, table)?;
    query_columns(&conn, &table)
}

pub fn fetch_pairs(
    path: &Path,
    table: &str,
    column: &str,
    secondary: &str,
) -> Result<Vec<RawRow>, DatasetError> {
    let conn = open(path)?;
    let table = resolve_table(&conn, table)?;
    let columns = query_columns(&conn, &table)?;

    let primary = find_column(&columns, column)
        .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;
    let secondary_expr = match find_column(&columns, secondary) {
        Some(info) => quote_identifier(&info.name),
        None => {
            log::debug!("table {} has no column {}, secondary is NULL", table, secondary);
            "NULL".to_string()
        }
    };

    let sql = format!(
        "SELECT {}, {} FROM {}",
        quote_identifier(&primary.name),
        secondary_expr,
        quote_identifier(&table)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawRow {
                primary: value_from_sql(row.get_ref(0)?),
                secondary: value_from_sql(row.get_ref(1)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("fetched {} rows from {}.{}", rows.len(), table, primary.name);
    Ok(rows)
}
