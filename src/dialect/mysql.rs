//! MySQL dialect. Grounded on `data_diff/databases/mysql.py`.
//!
//! MySQL has no `FULL OUTER JOIN` (JoinDiffer emulates it with a `LEFT JOIN
//! UNION RIGHT JOIN`, deduplicating via `UNION` rather than `UNION ALL`) and
//! no `IS DISTINCT FROM`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        false
    }

    fn supports_is_distinct_from(&self) -> bool {
        false
    }

    fn supports_full_outer_join(&self) -> bool {
        false
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS CHAR)")
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!("conv(substring(md5({expr}), {start}), 16, 10) - {CHECKSUM_OFFSET}")
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        // `%f` always yields 6 microsecond digits; coarser column precisions
        // are truncated by slicing and re-padding with zeros.
        let full = format!("DATE_FORMAT({expr}, '%Y-%m-%d %H:%i:%S.%f')");
        if precision >= 6 {
            full
        } else {
            let keep = 20 + precision;
            let pad = "0".repeat((6 - precision) as usize);
            format!("CONCAT(SUBSTRING({full}, 1, {keep}), '{pad}')")
        }
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" => {
                ColumnType::Integer
            }
            "decimal" | "numeric" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "float" => ColumnType::Float { precision: 7 },
            "double" => ColumnType::Float { precision: 15 },
            "bool" | "boolean" => ColumnType::Boolean,
            "datetime" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(0),
                rounds: false,
            },
            "timestamp" => ColumnType::Timestamp {
                precision: raw.datetime_precision.unwrap_or(0),
                rounds: false,
            },
            "date" => ColumnType::Date,
            "json" => ColumnType::Json,
            "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" => ColumnType::Text,
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
