//! PostgreSQL dialect. Grounded on `data_diff/databases/postgresql.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_BITSIZE, CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        true
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("({expr})::VARCHAR")
    }

    fn concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "('x' || substring(md5({expr}), {start}))::bit({CHECKSUM_BITSIZE})::bigint - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        format!(
            "to_char({expr}::timestamp({precision}), 'YYYY-MM-DD HH24:MI:SS.US')"
        )
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "smallint" | "integer" | "bigint" | "smallserial" | "serial" | "bigserial" => {
                ColumnType::Integer
            }
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
            "timestamp with time zone" | "timestamptz" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(6),
                rounds: true,
            },
            "date" => ColumnType::Date,
            "uuid" => ColumnType::NativeUuid,
            "json" | "jsonb" => ColumnType::Json,
            "character varying" | "varchar" | "char" | "character" | "text" => ColumnType::Text,
            _ if base.ends_with("[]") => {
                ColumnType::Array(Box::new(ColumnType::Unknown(base.to_string())))
            }
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
