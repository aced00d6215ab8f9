//! Presto dialect. Grounded on `data_diff/databases/presto.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct PrestoDialect;

impl Dialect for PrestoDialect {
    fn name(&self) -> &'static str {
        "presto"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        true
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS VARCHAR)")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "from_base(substr(to_hex(md5(to_utf8({expr}))), {start}), 16) - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        if precision >= 6 {
            format!("date_format({expr}, '%Y-%m-%d %H:%i:%S.%f')")
        } else {
            format!(
                "substr(date_format({expr}, '%Y-%m-%d %H:%i:%S.%f'), 1, {}) || '{}'",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "tinyint" | "smallint" | "integer" | "bigint" => ColumnType::Integer,
            "decimal" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "real" => ColumnType::Float { precision: 7 },
            "double" => ColumnType::Float { precision: 15 },
            "boolean" => ColumnType::Boolean,
            "timestamp" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(3),
                rounds: true,
            },
            "timestamp with time zone" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(3),
                rounds: true,
            },
            "date" => ColumnType::Date,
            "json" => ColumnType::Json,
            "varchar" | "char" => ColumnType::Text,
            _ if base.starts_with("row") => ColumnType::Struct,
            _ if base.starts_with("array") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
