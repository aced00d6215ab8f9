//! Redshift dialect. Grounded on `data_diff/databases/redshift.py`; Redshift
//! is Postgres-derived so most fragments reuse the ANSI/Postgres shape.

use super::Dialect;
use crate::constants::{CHECKSUM_BITSIZE, CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct RedshiftDialect;

impl Dialect for RedshiftDialect {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        true
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("({expr})::VARCHAR(MAX)")
    }

    fn concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "strtol(substring(md5({expr}), {start}, {CHECKSUM_HEXDIGITS}), 16) - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        format!("to_char({expr}::timestamp({precision}), 'YYYY-MM-DD HH24:MI:SS.US')")
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "smallint" | "integer" | "bigint" => ColumnType::Integer,
            "numeric" | "decimal" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "real" => ColumnType::Float { precision: 7 },
            "double precision" => ColumnType::Float { precision: 15 },
            "boolean" => ColumnType::Boolean,
            "timestamp" | "timestamp without time zone" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: true,
            },
            "timestamptz" | "timestamp with time zone" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: true,
            },
            "date" => ColumnType::Date,
            "super" => ColumnType::Json,
            "character varying" | "varchar" | "char" | "character" | "text" => ColumnType::Text,
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
