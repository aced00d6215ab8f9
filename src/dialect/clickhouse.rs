//! Clickhouse dialect. Grounded on `data_diff/databases/clickhouse.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct ClickhouseDialect;

impl Dialect for ClickhouseDialect {
    fn name(&self) -> &'static str {
        "clickhouse"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("toString({expr})")
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("concat({})", parts.join(", "))
    }

    fn supports_is_distinct_from(&self) -> bool {
        false
    }

    fn is_distinct_from(&self, a: &str, b: &str) -> String {
        format!("(isNull({a}) != isNull({b}) OR {a} != {b})")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "reinterpretAsUInt64(reverse(unhex(substr(lower(hex(MD5({expr}))), {start})))) - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        if precision == 0 {
            format!("formatDateTime({expr}, '%Y-%m-%d %H:%M:%S') || '.000000'")
        } else {
            format!(
                "substr(toString({expr}), 1, {}) || '{}'",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "int8" | "int16" | "int32" | "int64" | "uint8" | "uint16" | "uint32" | "uint64" => {
                ColumnType::Integer
            }
            "decimal" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "float32" => ColumnType::Float { precision: 7 },
            "float64" => ColumnType::Float { precision: 15 },
            "bool" => ColumnType::Boolean,
            "datetime64" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(3),
                rounds: false,
            },
            "datetime" => ColumnType::Datetime {
                precision: 0,
                rounds: false,
            },
            "date" | "date32" => ColumnType::Date,
            "uuid" => ColumnType::NativeUuid,
            "string" | "fixedstring" => ColumnType::Text,
            _ if base.starts_with("array") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
