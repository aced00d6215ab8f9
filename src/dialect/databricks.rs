//! Databricks (Spark SQL) dialect. Grounded on
//! `data_diff/databases/databricks.py` for type names; the checksum formula
//! follows the shared hex-slice pattern extrapolated from Spark's `conv`
//! built-in rather than recovered verbatim.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct DatabricksDialect;

impl Dialect for DatabricksDialect {
    fn name(&self) -> &'static str {
        "databricks"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS STRING)")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "(conv(substring(md5({expr}), {start}, {CHECKSUM_HEXDIGITS}), 16, 10) - {CHECKSUM_OFFSET})"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        if precision >= 6 {
            format!("date_format({expr}, 'yyyy-MM-dd HH:mm:ss.SSSSSS')")
        } else {
            format!(
                "concat(substring(date_format({expr}, 'yyyy-MM-dd HH:mm:ss.SSSSSS'), 1, {}), '{}')",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "tinyint" | "smallint" | "int" | "bigint" => ColumnType::Integer,
            "decimal" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "float" => ColumnType::Float { precision: 7 },
            "double" => ColumnType::Float { precision: 15 },
            "boolean" => ColumnType::Boolean,
            "timestamp" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "timestamp_ntz" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: false,
            },
            "date" => ColumnType::Date,
            "string" | "varchar" | "char" => ColumnType::Text,
            _ if base.starts_with("struct") => ColumnType::Struct,
            _ if base.starts_with("array") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
