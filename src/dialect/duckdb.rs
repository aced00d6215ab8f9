//! DuckDB dialect. Grounded on `data_diff/databases/duckdb.py` and on this
//! crate's own `duckdb::types::TypeConverter` for the type-name vocabulary.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct DuckDbDialect;

impl Dialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("{expr}::VARCHAR")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!("('0x' || SUBSTRING(md5({expr}), {start}, {CHECKSUM_HEXDIGITS}))::BIGINT")
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        // DuckDB's strftime always yields 6 fractional digits; coarser
        // precisions are truncated by zeroing the extra digits.
        if precision >= 6 {
            format!("strftime({expr}::TIMESTAMP, '%Y-%m-%d %H:%M:%S.%f')")
        } else {
            format!(
                "substr(strftime({expr}::TIMESTAMP, '%Y-%m-%d %H:%M:%S.%f'), 1, {}) || '{}'",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn set_timezone_to_utc(&self) -> Option<String> {
        Some("SET TimeZone='UTC'".to_string())
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_uppercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" => ColumnType::Integer,
            "DECIMAL" | "NUMERIC" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "FLOAT" => ColumnType::Float { precision: 7 },
            "DOUBLE" => ColumnType::Float { precision: 15 },
            "BOOLEAN" => ColumnType::Boolean,
            "TIMESTAMP" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "TIMESTAMPTZ" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "DATE" => ColumnType::Date,
            "UUID" => ColumnType::NativeUuid,
            "JSON" => ColumnType::Json,
            "VARCHAR" | "TEXT" | "BLOB" => ColumnType::Text,
            _ if base.starts_with("STRUCT") => ColumnType::Struct,
            _ if base.starts_with("LIST") || base.ends_with("[]") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
