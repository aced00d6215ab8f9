//! Row-level diffing across tables.
//!
//! Two engines share one contract (`diff_tables`) but take very different
//! routes: `hashdiff` bisects and checksums when the two sides live on
//! different connections, `joindiff` pushes the comparison into a single SQL
//! join when they share one. Grounded on `differ::Differ`'s split between
//! schema comparison and data comparison, generalized from dump files to live
//! database segments.

pub mod hashdiff;
pub mod joindiff;
pub mod output;

use crate::database::Database;
use crate::differ::DiffWarning;
use crate::error::DiffError;
use crate::segment::TableSegment;
use crate::tableschema::ColumnType;
use std::collections::HashMap;
use std::sync::Arc;

pub use hashdiff::{HashDiffConfig, HashDiffer};
pub use joindiff::{JoinDiffConfig, JoinDiffer, JoinDiffStats};

/// Which side of a diff row a tuple belongs to: absent from B (`Minus`, only
/// in A) or absent from A (`Plus`, only in B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Minus,
    Plus,
}

impl Sign {
    pub fn as_char(&self) -> char {
        match self {
            Sign::Minus => '-',
            Sign::Plus => '+',
        }
    }
}

/// A single diff tuple: `row` is positionally aligned with
/// `relevant_columns = key_columns ++ update_column? ++ extra_columns`.
pub type DiffRow = (Sign, Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// `JoinDiff` when both segments share one `Database`, else `HashDiff`.
    Auto,
    HashDiff,
    JoinDiff,
}

/// Validated configuration for a top-level `diff_tables` call. `key_columns`
/// is read off the `TableSegment`s passed to `diff_tables`; the fields here
/// only *augment* those segments (update column, extra columns) and tune the
/// chosen algorithm.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    pub update_column: Option<String>,
    pub extra_columns: Vec<String>,
    pub algorithm: Algorithm,
    pub bisection_factor: usize,
    pub bisection_threshold: usize,
    pub threaded: bool,
    pub max_threadpool_size: usize,
    pub skip_null_keys: bool,
    pub materialize_to_table: Option<Vec<String>>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            update_column: None,
            extra_columns: Vec::new(),
            algorithm: Algorithm::Auto,
            bisection_factor: 32,
            bisection_threshold: 16384,
            threaded: true,
            max_threadpool_size: 16,
            skip_null_keys: false,
            materialize_to_table: None,
        }
    }
}

/// Open a bounded view of `table_path`, keyed by `key_columns`, on `database`.
pub fn connect_to_table(
    database: Arc<dyn Database>,
    table_path: Vec<String>,
    key_columns: Vec<String>,
) -> Result<TableSegment, DiffError> {
    TableSegment::new(database, table_path, key_columns)
}

pub struct DiffOutcome {
    pub rows: Vec<DiffRow>,
    pub warnings: Vec<DiffWarning>,
    pub algorithm_used: Algorithm,
    /// Only populated for `Algorithm::JoinDiff` — `HashDiff` has no single
    /// query to derive row/column counts from without a second full pass.
    pub join_stats: Option<JoinDiffStats>,
}

/// Resolve `Algorithm::Auto` and run the chosen differ end-to-end.
pub fn diff_tables(a: TableSegment, b: TableSegment, config: &DiffConfig) -> Result<DiffOutcome, DiffError> {
    let a = apply_config(a, config);
    let b = apply_config(b, config);

    let algorithm = match config.algorithm {
        Algorithm::Auto if Arc::ptr_eq(a.database(), b.database()) => Algorithm::JoinDiff,
        Algorithm::Auto => Algorithm::HashDiff,
        other => other,
    };

    match algorithm {
        Algorithm::HashDiff => {
            let differ = HashDiffer::new(HashDiffConfig {
                bisection_factor: config.bisection_factor,
                bisection_threshold: config.bisection_threshold,
                threaded: config.threaded,
                max_threadpool_size: config.max_threadpool_size,
            })?;
            let rows = differ.diff(a, b)?;
            Ok(DiffOutcome {
                rows,
                warnings: differ.warnings(),
                algorithm_used: Algorithm::HashDiff,
                join_stats: None,
            })
        }
        Algorithm::JoinDiff => {
            let differ = JoinDiffer::new(JoinDiffConfig {
                skip_null_keys: config.skip_null_keys,
                materialize_to_table: config.materialize_to_table.clone(),
            })?;
            let rows = differ.diff(a, b)?;
            Ok(DiffOutcome {
                rows,
                warnings: differ.warnings(),
                algorithm_used: Algorithm::JoinDiff,
                join_stats: differ.stats(),
            })
        }
        Algorithm::Auto => unreachable!("Auto is resolved above"),
    }
}

fn apply_config(segment: TableSegment, config: &DiffConfig) -> TableSegment {
    let mut segment = segment;
    if let Some(update_column) = &config.update_column {
        segment = segment.with_update_column(update_column.clone());
    }
    if !config.extra_columns.is_empty() {
        segment = segment.with_extra_columns(config.extra_columns.clone());
    }
    segment
}

/// Shared precondition for both differs: every `relevant_column` must exist
/// on both sides, key columns must agree on key-type class (integer with
/// integer, UUID with UUID, alphanumeric with alphanumeric), and every
/// relevant column's type must be comparable across sides.
///
/// Two sides of a diff rarely declare byte-identical types for the same
/// column even when the data is semantically equal: a source on precision-6
/// timestamps and a replica truncated to precision-3 should still compare
/// equal on the shared 3 digits. When both sides are numeric or temporal,
/// precision (and the `rounds` flag that came with it) is reduced to
/// whichever side has the lower precision before comparison, with a warning;
/// when the two sides are from fundamentally incompatible families (e.g.
/// Numeric vs Text), the diff is rejected with `IncompatibleTypes` rather
/// than silently comparing them as opaque text. Returns the two segments
/// with their schemas adjusted to the reconciled types, since downstream
/// normalization reads `TableSegment::column_type`.
pub(crate) fn validate_relevant_columns(
    a: TableSegment,
    b: TableSegment,
) -> Result<(TableSegment, TableSegment, Vec<DiffWarning>), DiffError> {
    let a_schema = a
        .schema()
        .ok_or_else(|| DiffError::Configuration { message: "left segment schema not populated".to_string() })?
        .clone();
    let b_schema = b
        .schema()
        .ok_or_else(|| DiffError::Configuration { message: "right segment schema not populated".to_string() })?
        .clone();

    for col in a.relevant_columns() {
        if !b_schema.contains(&col) {
            return Err(DiffError::ColumnMissing { table: b.table_path().join("."), column: col });
        }
        if !a_schema.contains(&col) {
            return Err(DiffError::ColumnMissing { table: a.table_path().join("."), column: col });
        }
    }

    for key_col in a.key_columns() {
        let ta = a_schema
            .get(key_col)
            .ok_or_else(|| DiffError::ColumnMissing { table: a.table_path().join("."), column: key_col.clone() })?;
        let tb = b_schema
            .get(key_col)
            .ok_or_else(|| DiffError::ColumnMissing { table: b.table_path().join("."), column: key_col.clone() })?;
        match (ta.key_class(), tb.key_class()) {
            (Some(x), Some(y)) if x == y => {}
            _ => return Err(DiffError::KeyTypeMismatch { column: key_col.clone() }),
        }
    }

    let mut warnings = Vec::new();
    let mut a_overrides: HashMap<String, ColumnType> = HashMap::new();
    let mut b_overrides: HashMap<String, ColumnType> = HashMap::new();

    for col in a.relevant_columns() {
        let ta = a_schema.get(&col).expect("presence checked above").clone();
        let tb = b_schema.get(&col).expect("presence checked above").clone();

        if !ta.is_comparable_with(&tb) {
            return Err(DiffError::IncompatibleTypes {
                column: col,
                left: format!("{ta:?}"),
                right: format!("{tb:?}"),
            });
        }

        if ta.has_reconcilable_precision()
            && tb.has_reconcilable_precision()
            && (ta.precision() != tb.precision() || ta.rounds() != tb.rounds())
        {
            // Reduce to whichever side has the lower precision, taking its
            // `rounds` along with it (ties keep the left side's `rounds`).
            let (precision, rounds) =
                if ta.precision() <= tb.precision() { (ta.precision(), ta.rounds()) } else { (tb.precision(), tb.rounds()) };
            warnings.push(DiffWarning {
                table: Some(format!("{} / {}", a.table_path().join("."), b.table_path().join("."))),
                message: format!(
                    "column `{col}` has mismatched precision ({} vs {}); comparing at reduced precision {precision}",
                    ta.precision(),
                    tb.precision()
                ),
            });
            let a_name = a_schema.original_case_name(&col).unwrap_or(&col).to_string();
            let b_name = b_schema.original_case_name(&col).unwrap_or(&col).to_string();
            a_overrides.insert(a_name, ta.with_precision(precision, rounds));
            b_overrides.insert(b_name, tb.with_precision(precision, rounds));
        }
    }

    let a = if a_overrides.is_empty() { a } else { a.with_column_types(a_overrides) };
    let b = if b_overrides.is_empty() { b } else { b.with_column_types(b_overrides) };

    Ok((a, b, warnings))
}
