//! Column types and table schemas for live database introspection.
//!
//! Distinct from `schema::` (which parses `CREATE TABLE` DDL out of a dump
//! file): this module models what `Database::query_table_schema` returns for
//! a table that actually exists in a connected database, and the tagged type
//! union the diff engine normalizes and compares values through.

use std::collections::HashMap;

/// A column type as reported (or inferred) by a live database, with the
/// precision/case information the normalization layer needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Integer,
    /// `precision` fractional digits retained for comparison.
    Decimal { precision: u32 },
    /// Decimal digits of precision, derived from the engine's binary float precision.
    Float { precision: u32 },
    Boolean,
    Timestamp { precision: u32, rounds: bool },
    TimestampTz { precision: u32, rounds: bool },
    Datetime { precision: u32, rounds: bool },
    Date,
    Text,
    StringUuid { uppercase: bool },
    NativeUuid,
    StringAlphanumeric { fixed_length: Option<usize>, max_len: usize },
    Json,
    Array(Box<ColumnType>),
    Struct,
    Unknown(String),
}

impl ColumnType {
    /// Whether this type may be used as (part of) a primary key.
    pub fn is_key_comparable(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer
                | ColumnType::Decimal { precision: 0 }
                | ColumnType::StringUuid { .. }
                | ColumnType::NativeUuid
                | ColumnType::StringAlphanumeric { .. }
        )
    }

    /// The "key-type class" used to check that both sides of a diff agree on
    /// what kind of arithmetic their shared key column uses.
    pub fn key_class(&self) -> Option<&'static str> {
        match self {
            ColumnType::Integer | ColumnType::Decimal { precision: 0 } => Some("integer"),
            ColumnType::StringUuid { .. } | ColumnType::NativeUuid => Some("uuid"),
            ColumnType::StringAlphanumeric { .. } => Some("alphanumeric"),
            _ => None,
        }
    }

    pub fn precision(&self) -> u32 {
        match self {
            ColumnType::Decimal { precision }
            | ColumnType::Float { precision }
            | ColumnType::Timestamp { precision, .. }
            | ColumnType::TimestampTz { precision, .. }
            | ColumnType::Datetime { precision, .. } => *precision,
            _ => 0,
        }
    }

    pub fn rounds(&self) -> bool {
        match self {
            ColumnType::Timestamp { rounds, .. }
            | ColumnType::TimestampTz { rounds, .. }
            | ColumnType::Datetime { rounds, .. } => *rounds,
            _ => false,
        }
    }

    /// Return a copy of this type with temporal/numeric precision reduced to
    /// `precision` (and `rounds` set accordingly), used when two sides of a
    /// diff declare different precisions for the same column.
    pub fn with_precision(&self, precision: u32, rounds: bool) -> ColumnType {
        match self {
            ColumnType::Decimal { .. } => ColumnType::Decimal { precision },
            ColumnType::Float { .. } => ColumnType::Float { precision },
            ColumnType::Timestamp { .. } => ColumnType::Timestamp { precision, rounds },
            ColumnType::TimestampTz { .. } => ColumnType::TimestampTz { precision, rounds },
            ColumnType::Datetime { .. } => ColumnType::Datetime { precision, rounds },
            other => other.clone(),
        }
    }

    /// Whether this type carries a fractional-digit precision that two sides
    /// of a diff might disagree on (temporal or numeric, but not integers,
    /// which always have precision 0).
    pub fn has_reconcilable_precision(&self) -> bool {
        matches!(
            self,
            ColumnType::Decimal { .. }
                | ColumnType::Float { .. }
                | ColumnType::Timestamp { .. }
                | ColumnType::TimestampTz { .. }
                | ColumnType::Datetime { .. }
        )
    }

    /// The broad comparability class used to reject comparing, e.g., a
    /// Numeric column against a Text column. Two columns with the same class
    /// can be normalized and compared meaningfully; `Unknown` is treated as
    /// compatible with anything since it already produced a schema warning
    /// and is only ever passed through opaquely.
    pub fn compare_class(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Decimal { .. } | ColumnType::Float { .. } => "numeric",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp { .. }
            | ColumnType::TimestampTz { .. }
            | ColumnType::Datetime { .. }
            | ColumnType::Date => "temporal",
            ColumnType::Text | ColumnType::StringAlphanumeric { .. } => "text",
            ColumnType::StringUuid { .. } | ColumnType::NativeUuid => "uuid",
            ColumnType::Json => "json",
            ColumnType::Array(_) => "array",
            ColumnType::Struct => "struct",
            ColumnType::Unknown(_) => "unknown",
        }
    }

    /// Whether `self` and `other` may be normalized and compared as the same
    /// shared column in a diff.
    pub fn is_comparable_with(&self, other: &ColumnType) -> bool {
        let (a, b) = (self.compare_class(), other.compare_class());
        a == b || a == "unknown" || b == "unknown"
    }
}

/// The raw schema row returned from an `information_schema`-equivalent query,
/// before a `Dialect::parse_type` turns it into a `ColumnType`.
#[derive(Debug, Clone)]
pub struct RawColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub datetime_precision: Option<u32>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub collation: Option<String>,
}

/// An ordered mapping from column name to `ColumnType`, with case-sensitive
/// or case-insensitive lookup. The case-insensitive variant preserves the
/// first-seen original-case key; a later ambiguous collision is rejected so
/// the caller can turn it into a warning.
#[derive(Debug, Clone)]
pub struct Schema {
    case_sensitive: bool,
    columns: Vec<(String, ColumnType)>,
    lookup: HashMap<String, usize>,
}

impl Schema {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive, columns: Vec::new(), lookup: HashMap::new() }
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive { name.to_string() } else { name.to_lowercase() }
    }

    /// Insert a column. Returns `Err(message)` on an ambiguous case-insensitive
    /// collision; the column is not inserted in that case.
    pub fn insert(&mut self, name: impl Into<String>, ty: ColumnType) -> Result<(), String> {
        let name = name.into();
        let key = self.key(&name);
        if self.lookup.contains_key(&key) {
            return Err(format!(
                "column `{name}` collides case-insensitively with an existing column"
            ));
        }
        self.lookup.insert(key, self.columns.len());
        self.columns.push((name, ty));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnType> {
        self.lookup.get(&self.key(name)).map(|&i| &self.columns[i].1)
    }

    pub fn original_case_name(&self, name: &str) -> Option<&str> {
        self.lookup.get(&self.key(name)).map(|&i| self.columns[i].0.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(&self.key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ColumnType)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_collision_rejected() {
        let mut s = Schema::new(false);
        s.insert("Id", ColumnType::Integer).unwrap();
        assert!(s.insert("ID", ColumnType::Integer).is_err());
        assert_eq!(s.original_case_name("id"), Some("Id"));
    }

    #[test]
    fn precision_reduction_keeps_variant() {
        let t = ColumnType::Timestamp { precision: 6, rounds: true };
        let reduced = t.with_precision(3, false);
        assert_eq!(reduced, ColumnType::Timestamp { precision: 3, rounds: false });
    }
}
