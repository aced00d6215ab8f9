//! DuckDB-backed `Database`. Grounded on this crate's own
//! `duckdb::QueryEngine`: same `duckdb` crate, same `ValueRef` → owned-value
//! mapping, but returning the diff engine's dialect-agnostic `RowValue`
//! instead of pre-formatted strings, and opening a file/memory path taken
//! from a connection URI rather than loading a dump.

use super::{ConnectionUri, Database, RowValue};
use crate::dialect::{Dialect, DialectKind};
use crate::error::DiffError;
use crate::tableschema::RawColumnInfo;
use duckdb::Connection;
use std::sync::Mutex;

pub struct DuckDbDatabase {
    conn: Mutex<Connection>,
    dialect: Box<dyn Dialect>,
}

impl DuckDbDatabase {
    pub fn connect(uri: &ConnectionUri) -> Result<Self, DiffError> {
        let path = uri.database_name();
        let conn = if path.is_empty() || path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| DiffError::Connection { message: e.to_string() })?;

        Ok(Self {
            conn: Mutex::new(conn),
            dialect: DialectKind::DuckDb.dialect(),
        })
    }

    fn to_row_value(v: duckdb::types::ValueRef) -> RowValue {
        use duckdb::types::ValueRef;
        match v {
            ValueRef::Null => RowValue::Null,
            ValueRef::Boolean(b) => RowValue::Bool(b),
            ValueRef::TinyInt(n) => RowValue::Int(n as i128),
            ValueRef::SmallInt(n) => RowValue::Int(n as i128),
            ValueRef::Int(n) => RowValue::Int(n as i128),
            ValueRef::BigInt(n) => RowValue::Int(n as i128),
            ValueRef::HugeInt(n) => RowValue::Int(n),
            ValueRef::UTinyInt(n) => RowValue::Int(n as i128),
            ValueRef::USmallInt(n) => RowValue::Int(n as i128),
            ValueRef::UInt(n) => RowValue::Int(n as i128),
            ValueRef::UBigInt(n) => RowValue::Int(n as i128),
            ValueRef::Float(f) => RowValue::Float(f as f64),
            ValueRef::Double(f) => RowValue::Float(f),
            ValueRef::Text(s) => RowValue::Text(String::from_utf8_lossy(s).to_string()),
            ValueRef::Decimal(d) => RowValue::Text(d.to_string()),
            other => RowValue::Text(format!("{other:?}")),
        }
    }
}

impl Database for DuckDbDatabase {
    fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    fn query_table_schema(&self, table_path: &[String]) -> Result<Vec<RawColumnInfo>, DiffError> {
        let table = table_path.last().cloned().unwrap_or_default();
        let sql = format!(
            "SELECT column_name, data_type, datetime_precision, numeric_precision, numeric_scale, collation_name \
             FROM information_schema.columns WHERE table_name = '{}' ORDER BY ordinal_position",
            table.replace('\'', "''")
        );
        let rows = self.select_rows(&sql)?;
        if rows.is_empty() {
            return Err(DiffError::TableDoesNotExist { table });
        }
        Ok(rows
            .into_iter()
            .map(|r| RawColumnInfo {
                column_name: cell_to_string(&r[0]),
                data_type: cell_to_string(&r[1]),
                datetime_precision: cell_to_u32(&r[2]),
                numeric_precision: cell_to_u32(&r[3]),
                numeric_scale: cell_to_u32(&r[4]),
                collation: match &r[5] {
                    RowValue::Null => None,
                    other => Some(cell_to_string(other)),
                },
            })
            .collect())
    }

    fn select_rows(&self, sql: &str) -> Result<Vec<Vec<RowValue>>, DiffError> {
        let conn = self.conn.lock().expect("duckdb connection mutex poisoned");
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DiffError::QueryExecution { message: format!("{e} in: {sql}") })?;
        let col_count = stmt.column_count();
        let mut result = stmt
            .query([])
            .map_err(|e| DiffError::QueryExecution { message: format!("{e} in: {sql}") })?;

        let mut rows = Vec::new();
        while let Some(row) = result
            .next()
            .map_err(|e| DiffError::QueryExecution { message: e.to_string() })?
        {
            let mut values = Vec::with_capacity(col_count);
            for i in 0..col_count {
                let v = row
                    .get_ref(i)
                    .map_err(|e| DiffError::QueryExecution { message: e.to_string() })?;
                values.push(Self::to_row_value(v));
            }
            rows.push(values);
        }
        Ok(rows)
    }

    fn execute(&self, sql: &str) -> Result<u64, DiffError> {
        let conn = self.conn.lock().expect("duckdb connection mutex poisoned");
        conn.execute(sql, [])
            .map(|n| n as u64)
            .map_err(|e| DiffError::QueryExecution { message: format!("{e} in: {sql}") })
    }
}

fn cell_to_string(v: &RowValue) -> String {
    match v {
        RowValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_u32(v: &RowValue) -> Option<u32> {
    match v {
        RowValue::Null => None,
        RowValue::Int(i) => Some(*i as u32),
        RowValue::Float(f) => Some(*f as u32),
        RowValue::Text(s) => s.parse().ok(),
        RowValue::Bool(_) => None,
    }
}
