//! Snowflake dialect. Grounded on `data_diff/databases/snowflake.py` for type
//! names; the checksum formula follows the same pattern as the other
//! warehouses (`MD5_NUMBER_LOWER64` truncated to the shared hex window) but
//! wasn't recovered verbatim and is extrapolated.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct SnowflakeDialect;

impl Dialect for SnowflakeDialect {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS VARCHAR)")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "TO_NUMBER(SUBSTR(MD5_HEX({expr}), {start}, {CHECKSUM_HEXDIGITS}), 'XXXXXXXXXXXXXXX') - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        if precision >= 6 {
            format!("TO_CHAR({expr}, 'YYYY-MM-DD HH24:MI:SS.FF6')")
        } else {
            format!(
                "SUBSTR(TO_CHAR({expr}, 'YYYY-MM-DD HH24:MI:SS.FF6'), 1, {}) || '{}'",
                20 + precision,
                "0".repeat((6 - precision) as usize)
            )
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_uppercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "NUMBER" => match raw.numeric_scale {
                Some(0) | None => ColumnType::Integer,
                Some(scale) => ColumnType::Decimal { precision: scale },
            },
            "FLOAT" | "DOUBLE" | "REAL" => ColumnType::Float { precision: 15 },
            "BOOLEAN" => ColumnType::Boolean,
            "TIMESTAMP_NTZ" | "TIMESTAMP" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(9).min(6),
                rounds: false,
            },
            "TIMESTAMP_TZ" | "TIMESTAMP_LTZ" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(9).min(6),
                rounds: false,
            },
            "DATE" => ColumnType::Date,
            "VARIANT" => ColumnType::Json,
            "VARCHAR" | "STRING" | "TEXT" | "CHAR" => ColumnType::Text,
            "ARRAY" => ColumnType::Array(Box::new(ColumnType::Unknown("VARIANT".to_string()))),
            "OBJECT" => ColumnType::Struct,
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
