//! BigQuery dialect. Grounded on `data_diff/databases/bigquery.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct BigQueryDialect;

impl Dialect for BigQueryDialect {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "\\`"))
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS STRING)")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "cast(cast(concat('0x', substr(TO_HEX(md5({expr})), {start})) as int64) as numeric) - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        if precision >= 6 {
            format!("FORMAT_TIMESTAMP('%Y-%m-%d %H:%M:%E6S', {expr})")
        } else {
            format!(
                "substr(FORMAT_TIMESTAMP('%Y-%m-%d %H:%M:%E6S', {expr}), 1, {}) || '{}'",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_uppercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "INT64" | "INTEGER" => ColumnType::Integer,
            "NUMERIC" | "BIGNUMERIC" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "FLOAT64" => ColumnType::Float { precision: 15 },
            "BOOL" | "BOOLEAN" => ColumnType::Boolean,
            "TIMESTAMP" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "DATETIME" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "DATE" => ColumnType::Date,
            "JSON" => ColumnType::Json,
            "STRING" => ColumnType::Text,
            _ if base.starts_with("STRUCT") => ColumnType::Struct,
            _ if base.starts_with("ARRAY") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
