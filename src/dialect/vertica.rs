//! Vertica dialect. Grounded on `data_diff/databases/vertica.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct VerticaDialect;

impl Dialect for VerticaDialect {
    fn name(&self) -> &'static str {
        "vertica"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        true
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS VARCHAR)")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "TO_NUMBER(SUBSTRING(HEX_TO_BINARY('0x' || MD5({expr}))::VARCHAR, {start}, {CHECKSUM_HEXDIGITS}), 'XXXXXXXXXXXXXXX') - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        let mask = "F".repeat(precision.max(1) as usize);
        format!("TO_CHAR({expr}::TIMESTAMP, 'YYYY-MM-DD HH24:MI:SS.{mask}')")
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" => ColumnType::Integer,
            "numeric" | "decimal" | "number" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "float" | "double precision" => ColumnType::Float { precision: 15 },
            "boolean" => ColumnType::Boolean,
            "timestamp" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: true,
            },
            "timestamptz" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: true,
            },
            "date" => ColumnType::Date,
            "char" | "varchar" | "long varchar" => ColumnType::Text,
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
