//! SQL Server dialect. Grounded on `data_diff/databases/mssql.py`.

use super::Dialect;
use crate::constants::{CHECKSUM_HEXDIGITS, CHECKSUM_OFFSET, MD5_HEXDIGITS};
use crate::tableschema::{ColumnType, RawColumnInfo};

pub struct MsSqlDialect;

impl Dialect for MsSqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn rounds_on_precision_loss(&self) -> bool {
        true
    }

    fn quote(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS NVARCHAR(MAX))")
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn is_distinct_from(&self, a: &str, b: &str) -> String {
        format!(
            "(({a} <> {b} OR {a} IS NULL OR {b} IS NULL) AND NOT ({a} IS NULL AND {b} IS NULL))"
        )
    }

    fn supports_is_distinct_from(&self) -> bool {
        false
    }

    fn offset_limit(&self, offset: Option<u64>, limit: Option<u64>) -> String {
        let mut out = String::new();
        out.push_str(&format!(" OFFSET {} ROWS", offset.unwrap_or(0)));
        if let Some(limit) = limit {
            out.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }
        out
    }

    fn md5_as_int(&self, expr: &str) -> String {
        let start = 1 + MD5_HEXDIGITS - CHECKSUM_HEXDIGITS;
        format!(
            "CONVERT(BIGINT, CONVERT(VARBINARY, '0x' + SUBSTRING(CONVERT(VARCHAR(32), HashBytes('MD5', {expr}), 2), {start}, {CHECKSUM_HEXDIGITS}), 1)) - {CHECKSUM_OFFSET}"
        )
    }

    fn normalize_timestamp(&self, expr: &str, precision: u32, _rounds: bool) -> String {
        format!("FORMAT({expr}, 'yyyy-MM-dd HH:mm:ss.{}')", "f".repeat(precision.max(1) as usize))
    }

    fn parse_type(&self, _table_path: &[String], _col_name: &str, raw: &RawColumnInfo) -> ColumnType {
        let t = raw.data_type.to_lowercase();
        let base = t.split('(').next().unwrap_or(&t).trim();
        match base {
            "tinyint" | "smallint" | "int" | "bigint" => ColumnType::Integer,
            "decimal" | "numeric" | "money" => ColumnType::Decimal {
                precision: raw.numeric_scale.unwrap_or(0),
            },
            "real" => ColumnType::Float { precision: 7 },
            "float" => ColumnType::Float { precision: 15 },
            "bit" => ColumnType::Boolean,
            "datetime" | "datetime2" | "smalldatetime" => ColumnType::Datetime {
                precision: raw.datetime_precision.unwrap_or(3),
                rounds: true,
            },
            "datetimeoffset" => ColumnType::TimestampTz {
                precision: raw.datetime_precision.unwrap_or(3),
                rounds: true,
            },
            "date" => ColumnType::Date,
            "uniqueidentifier" => ColumnType::NativeUuid,
            "char" | "varchar" | "nchar" | "nvarchar" | "text" | "ntext" => ColumnType::Text,
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}
