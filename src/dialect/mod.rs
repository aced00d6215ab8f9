//! Per-engine SQL fragment generation and type parsing.
//!
//! A `Dialect` never touches a connection; it only turns already-compiled
//! sub-expressions (strings) into new expressions, and parses raw schema rows
//! into `ColumnType`s. The set of known dialects is closed at compile time:
//! `DialectKind` is the URI-scheme-keyed enum callers dispatch on.

mod ansi;
mod bigquery;
mod clickhouse;
mod databricks;
mod duckdb;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod presto;
mod redshift;
mod snowflake;
mod trino;
mod vertica;

use crate::tableschema::{ColumnType, RawColumnInfo};
use chrono::NaiveDateTime;

/// Per-engine SQL fragment generator and type parser.
///
/// Every method returns a string fragment; none perform I/O. Default bodies
/// implement the ANSI-standard behavior so a concrete dialect only overrides
/// what its engine actually does differently.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when casting a temporal value to a lower precision rounds;
    /// false when it truncates.
    fn rounds_on_precision_loss(&self) -> bool;

    fn supports_is_distinct_from(&self) -> bool {
        true
    }

    fn supports_full_outer_join(&self) -> bool {
        true
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn concat(&self, parts: &[String]) -> String {
        ansi::concat_with_concat_fn(parts)
    }

    fn to_string_expr(&self, expr: &str) -> String {
        format!("CAST({expr} AS VARCHAR)")
    }

    fn is_distinct_from(&self, a: &str, b: &str) -> String {
        if self.supports_is_distinct_from() {
            format!("({a} IS DISTINCT FROM {b})")
        } else {
            ansi::is_distinct_from_fallback(a, b)
        }
    }

    fn random(&self) -> String {
        "RANDOM()".to_string()
    }

    fn current_timestamp(&self) -> String {
        "CURRENT_TIMESTAMP".to_string()
    }

    fn offset_limit(&self, offset: Option<u64>, limit: Option<u64>) -> String {
        ansi::offset_limit(offset, limit)
    }

    fn timestamp_value(&self, t: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", t.format("%Y-%m-%d %H:%M:%S%.6f"))
    }

    /// `None` means "not supported"; the caller must warn and continue.
    fn set_timezone_to_utc(&self) -> Option<String> {
        Some("SET TIME ZONE 'UTC'".to_string())
    }

    /// An integer in `[-2^59, 2^59)` or `[0, 2^60)` derived from a
    /// deterministic 15-hex-digit MD5 suffix. Every dialect must agree on the
    /// same bit-slice of the same MD5 digest for the same input byte string.
    fn md5_as_int(&self, expr: &str) -> String;

    /// A 26-character `YYYY-MM-DD HH:MM:SS.FFFFFF` string.
    fn normalize_timestamp(&self, expr: &str, precision: u32, rounds: bool) -> String;

    /// An `I[.P]` string with exactly `precision` fractional digits.
    fn normalize_number(&self, expr: &str, precision: u32) -> String {
        ansi::normalize_number_via_cast(expr, precision)
    }

    fn normalize_boolean(&self, expr: &str) -> String {
        format!("(CASE WHEN {expr} THEN '1' ELSE '0' END)")
    }

    fn normalize_uuid(&self, expr: &str, uppercase: bool) -> String {
        if uppercase {
            format!("UPPER(TRIM({expr}))")
        } else {
            format!("LOWER(TRIM({expr}))")
        }
    }

    fn normalize_json(&self, expr: &str) -> String {
        self.to_string_expr(expr)
    }

    fn normalize_array(&self, expr: &str) -> String {
        self.to_string_expr(expr)
    }

    fn normalize_struct(&self, expr: &str) -> String {
        self.to_string_expr(expr)
    }

    fn normalize_value_by_type(&self, expr: &str, ty: &ColumnType) -> String {
        match ty {
            ColumnType::Integer => self.to_string_expr(expr),
            ColumnType::Decimal { precision } | ColumnType::Float { precision } => {
                self.normalize_number(expr, *precision)
            }
            ColumnType::Boolean => self.normalize_boolean(expr),
            ColumnType::Timestamp { precision, rounds }
            | ColumnType::TimestampTz { precision, rounds }
            | ColumnType::Datetime { precision, rounds } => {
                self.normalize_timestamp(expr, *precision, *rounds)
            }
            ColumnType::Date => self.normalize_timestamp(expr, 0, self.rounds_on_precision_loss()),
            ColumnType::StringUuid { uppercase } => self.normalize_uuid(expr, *uppercase),
            ColumnType::NativeUuid => self.normalize_uuid(expr, false),
            ColumnType::StringAlphanumeric { .. } => self.to_string_expr(expr),
            ColumnType::Json => self.normalize_json(expr),
            ColumnType::Array(_) => self.normalize_array(expr),
            ColumnType::Struct => self.normalize_struct(expr),
            ColumnType::Text | ColumnType::Unknown(_) => self.to_string_expr(expr),
        }
    }

    /// Recognize this engine's type-name patterns. Unknown types map to
    /// `Unknown` with the raw string preserved (the caller warns).
    fn parse_type(&self, table_path: &[String], col_name: &str, raw: &RawColumnInfo) -> ColumnType;
}

/// The closed set of engines this crate knows a SQL dialect for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    DuckDb,
    Postgres,
    MySql,
    Oracle,
    Snowflake,
    BigQuery,
    Redshift,
    Presto,
    Trino,
    Databricks,
    Clickhouse,
    Vertica,
    MsSql,
}

impl DialectKind {
    pub const ALL: [DialectKind; 13] = [
        DialectKind::DuckDb,
        DialectKind::Postgres,
        DialectKind::MySql,
        DialectKind::Oracle,
        DialectKind::Snowflake,
        DialectKind::BigQuery,
        DialectKind::Redshift,
        DialectKind::Presto,
        DialectKind::Trino,
        DialectKind::Databricks,
        DialectKind::Clickhouse,
        DialectKind::Vertica,
        DialectKind::MsSql,
    ];

    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "duckdb" => Some(Self::DuckDb),
            "postgresql" | "postgres" => Some(Self::Postgres),
            "mysql" => Some(Self::MySql),
            "oracle" => Some(Self::Oracle),
            "snowflake" => Some(Self::Snowflake),
            "bigquery" => Some(Self::BigQuery),
            "redshift" => Some(Self::Redshift),
            "presto" => Some(Self::Presto),
            "trino" => Some(Self::Trino),
            "databricks" => Some(Self::Databricks),
            "clickhouse" => Some(Self::Clickhouse),
            "vertica" => Some(Self::Vertica),
            "mssql" => Some(Self::MsSql),
            _ => None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::DuckDb => "duckdb",
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::Oracle => "oracle",
            Self::Snowflake => "snowflake",
            Self::BigQuery => "bigquery",
            Self::Redshift => "redshift",
            Self::Presto => "presto",
            Self::Trino => "trino",
            Self::Databricks => "databricks",
            Self::Clickhouse => "clickhouse",
            Self::Vertica => "vertica",
            Self::MsSql => "mssql",
        }
    }

    /// Whether `database::connect()` can actually open a connection for this
    /// engine: only the engines with a real driver crate in this workspace.
    pub fn has_driver(&self) -> bool {
        matches!(self, Self::DuckDb | Self::Postgres)
    }

    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            Self::DuckDb => Box::new(duckdb::DuckDbDialect),
            Self::Postgres => Box::new(postgres::PostgresDialect),
            Self::MySql => Box::new(mysql::MySqlDialect),
            Self::Oracle => Box::new(oracle::OracleDialect),
            Self::Snowflake => Box::new(snowflake::SnowflakeDialect),
            Self::BigQuery => Box::new(bigquery::BigQueryDialect),
            Self::Redshift => Box::new(redshift::RedshiftDialect),
            Self::Presto => Box::new(presto::PrestoDialect),
            Self::Trino => Box::new(trino::TrinoDialect),
            Self::Databricks => Box::new(databricks::DatabricksDialect),
            Self::Clickhouse => Box::new(clickhouse::ClickhouseDialect),
            Self::Vertica => Box::new(vertica::VerticaDialect),
            Self::MsSql => Box::new(mssql::MsSqlDialect),
        }
    }
}
