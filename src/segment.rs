//! `TableSegment`: a bounded, immutable slice of a table.
//!
//! Every "mutation" returns a new `TableSegment` sharing the same `Database`
//! and, once populated, the same `Schema` — mirroring the way `differ::Differ`
//! threads an immutable `DiffConfig` through its passes rather than mutating
//! shared state in place.

use crate::constants::{SCHEMA_SAMPLE_SIZE, SLOW_QUERY_WARNING_SECS};
use crate::database::{Database, RowValue};
use crate::dialect::Dialect;
use crate::differ::DiffWarning;
use crate::error::DiffError;
use crate::key::{ArithAlphanumeric, ArithUuid, KeyValue, Vector};
use crate::query::{Compiler, Expr, TableExpr};
use crate::tableschema::{ColumnType, Schema};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// A bounded view of a table: key range, optional update-time window, optional
/// extra predicate. See `with_schema` for the lazily-populated `Schema`.
#[derive(Clone)]
pub struct TableSegment {
    database: Arc<dyn Database>,
    table_path: Vec<String>,
    key_columns: Vec<String>,
    update_column: Option<String>,
    extra_columns: Vec<String>,
    min_key: Option<Vector>,
    max_key: Option<Vector>,
    min_update: Option<NaiveDateTime>,
    max_update: Option<NaiveDateTime>,
    where_clause: Option<String>,
    case_sensitive: bool,
    schema: Option<Arc<Schema>>,
}

impl TableSegment {
    pub fn new(
        database: Arc<dyn Database>,
        table_path: Vec<String>,
        key_columns: Vec<String>,
    ) -> Result<Self, DiffError> {
        if key_columns.is_empty() {
            return Err(DiffError::Configuration {
                message: format!("table `{}` needs at least one key column", table_path.join(".")),
            });
        }
        Ok(Self {
            database,
            table_path,
            key_columns,
            update_column: None,
            extra_columns: Vec::new(),
            min_key: None,
            max_key: None,
            min_update: None,
            max_update: None,
            where_clause: None,
            case_sensitive: true,
            schema: None,
        })
    }

    pub fn with_update_column(mut self, column: impl Into<String>) -> Self {
        self.update_column = Some(column.into());
        self
    }

    pub fn with_extra_columns(mut self, columns: Vec<String>) -> Self {
        self.extra_columns = columns;
        self
    }

    pub fn with_where(mut self, predicate: impl Into<String>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_key_range(mut self, min_key: Option<Vector>, max_key: Option<Vector>) -> Result<Self, DiffError> {
        if let (Some(lo), Some(hi)) = (&min_key, &max_key) {
            match lo.partial_cmp(hi) {
                Some(std::cmp::Ordering::Less) => {}
                Some(_) => {
                    return Err(DiffError::Configuration {
                        message: "min_key must be strictly less than max_key".to_string(),
                    })
                }
                None => return Err(DiffError::KeyTypeMismatch { column: self.key_columns.join(",") }),
            }
        }
        self.min_key = min_key;
        self.max_key = max_key;
        Ok(self)
    }

    /// Clone this segment with a narrower key range, sharing database and schema.
    pub fn with_bounds(&self, min_key: Vector, max_key: Vector) -> Result<Self, DiffError> {
        let mut clone = self.clone();
        clone.min_key = Some(min_key);
        clone.max_key = Some(max_key);
        if let (Some(lo), Some(hi)) = (&clone.min_key, &clone.max_key) {
            if !matches!(lo.partial_cmp(hi), Some(std::cmp::Ordering::Less)) {
                return Err(DiffError::KeyTypeMismatch { column: self.key_columns.join(",") });
            }
        }
        Ok(clone)
    }

    pub fn with_update_range(
        mut self,
        min_update: Option<NaiveDateTime>,
        max_update: Option<NaiveDateTime>,
    ) -> Result<Self, DiffError> {
        if (min_update.is_some() || max_update.is_some()) && self.update_column.is_none() {
            return Err(DiffError::Configuration {
                message: "update_column is required when an update-time bound is set".to_string(),
            });
        }
        if let (Some(lo), Some(hi)) = (min_update, max_update) {
            if lo >= hi {
                return Err(DiffError::Configuration {
                    message: "min_update must be strictly less than max_update".to_string(),
                });
            }
        }
        self.min_update = min_update;
        self.max_update = max_update;
        Ok(self)
    }

    pub fn is_bounded(&self) -> bool {
        self.min_key.is_some() && self.max_key.is_some()
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn table_path(&self) -> &[String] {
        &self.table_path
    }

    pub fn min_key(&self) -> Option<&Vector> {
        self.min_key.as_ref()
    }

    pub fn max_key(&self) -> Option<&Vector> {
        self.max_key.as_ref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    pub fn update_column(&self) -> Option<&str> {
        self.update_column.as_deref()
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// `key_columns ++ update_column? ++ extra_columns`, in that order.
    pub fn relevant_columns(&self) -> Vec<String> {
        let mut cols = self.key_columns.clone();
        if let Some(uc) = &self.update_column {
            cols.push(uc.clone());
        }
        cols.extend(self.extra_columns.iter().cloned());
        cols
    }

    pub(crate) fn column_type(&self, name: &str) -> ColumnType {
        self.schema
            .as_ref()
            .and_then(|s| s.get(name).cloned())
            .unwrap_or(ColumnType::Text)
    }

    pub(crate) fn dialect(&self) -> &dyn Dialect {
        self.database.dialect()
    }

    /// Populate `schema` by querying column metadata, then refining Text
    /// columns into `String_UUID`/`String_Alphanumeric` by sampling rows.
    pub fn with_schema(&self) -> Result<(Self, Vec<DiffWarning>), DiffError> {
        let table_name = self.table_path.join(".");
        let raw_columns = self.database.query_table_schema(&self.table_path)?;
        let mut warnings = Vec::new();
        let mut schema = Schema::new(self.case_sensitive);

        for raw in &raw_columns {
            let ty = self.dialect().parse_type(&self.table_path, &raw.column_name, raw);
            if let ColumnType::Unknown(raw_ty) = &ty {
                warnings.push(DiffWarning {
                    table: Some(table_name.clone()),
                    message: format!("column `{}` has unrecognized type `{raw_ty}`, comparing as opaque text", raw.column_name),
                });
            }
            if let Err(msg) = schema.insert(raw.column_name.clone(), ty) {
                warnings.push(DiffWarning { table: Some(table_name.clone()), message: msg });
            }
        }

        let text_columns: Vec<String> = schema
            .iter()
            .filter(|(_, ty)| matches!(ty, ColumnType::Text))
            .map(|(name, _)| name.clone())
            .collect();

        for col in text_columns {
            if let Some(refined) = self.sample_text_column(&col, &mut warnings)? {
                let existing: Vec<(String, ColumnType)> = schema.iter().cloned().collect();
                let mut rebuilt = Schema::new(self.case_sensitive);
                for (name, ty) in existing {
                    if name == col {
                        rebuilt.insert(name, refined.clone()).ok();
                    } else {
                        rebuilt.insert(name, ty).ok();
                    }
                }
                schema = rebuilt;
            }
        }

        let mut clone = self.clone();
        clone.schema = Some(Arc::new(schema));
        Ok((clone, warnings))
    }

    /// Clone this segment with some of its schema's column types replaced,
    /// keyed by the schema's original-case column name. Used to reconcile
    /// mismatched precision between two sides of a diff after `with_schema`.
    pub(crate) fn with_column_types(&self, overrides: HashMap<String, ColumnType>) -> TableSegment {
        let Some(schema) = &self.schema else {
            return self.clone();
        };
        let mut rebuilt = Schema::new(self.case_sensitive);
        for (name, ty) in schema.iter() {
            let ty = overrides.get(name).cloned().unwrap_or_else(|| ty.clone());
            rebuilt.insert(name.clone(), ty).ok();
        }
        let mut clone = self.clone();
        clone.schema = Some(Arc::new(rebuilt));
        clone
    }

    fn sample_text_column(&self, column: &str, warnings: &mut Vec<DiffWarning>) -> Result<Option<ColumnType>, DiffError> {
        let table = TableExpr::path(&self.table_path.iter().map(String::as_str).collect::<Vec<_>>());
        let select = table.select(vec![Expr::column(column)]).limit(SCHEMA_SAMPLE_SIZE as u64);
        let sql = Compiler::new(self.dialect()).compile_root(&select);
        let rows = self.database.select_rows(&sql)?;

        let samples: Vec<String> = rows
            .into_iter()
            .filter_map(|mut row| row.pop())
            .filter_map(|v| match v {
                RowValue::Null => None,
                other => Some(other.to_string()),
            })
            .collect();

        if samples.is_empty() {
            return Ok(None);
        }

        if samples.iter().all(|s| ArithUuid::parse(s).is_ok()) {
            let uppercase = samples.iter().any(|s| s.chars().any(|c| c.is_ascii_uppercase()));
            return Ok(Some(ColumnType::StringUuid { uppercase }));
        }

        let alphanumeric_ok = samples.iter().all(|s| {
            s.chars().all(|c| crate::constants::ALPHANUMERIC_ALPHABET.contains(c))
        });
        if alphanumeric_ok {
            let lengths: Vec<usize> = samples.iter().map(|s| s.chars().count()).collect();
            let max_len = *lengths.iter().max().unwrap();
            let fixed_length = if lengths.iter().all(|l| *l == lengths[0]) {
                Some(lengths[0])
            } else {
                None
            };
            return Ok(Some(ColumnType::StringAlphanumeric { fixed_length, max_len }));
        }

        warnings.push(DiffWarning {
            table: Some(self.table_path.join(".")),
            message: format!("column `{column}` has mixed non-UUID, non-alphanumeric text samples; comparing as text"),
        });
        Ok(None)
    }

    pub(crate) fn filtered_table(&self) -> TableExpr {
        let mut predicates = Vec::new();

        for (i, key_col) in self.key_columns.iter().enumerate() {
            if let Some(min_key) = &self.min_key {
                predicates.push(Self::key_bound_predicate(key_col, &min_key.0[i], true));
            }
            if let Some(max_key) = &self.max_key {
                predicates.push(Self::key_bound_predicate(key_col, &max_key.0[i], false));
            }
        }

        if let Some(update_col) = &self.update_column {
            if let Some(min_update) = self.min_update {
                predicates.push(Expr::column(update_col.as_str()).ge(Expr::Raw(self.dialect().timestamp_value(&min_update))));
            }
            if let Some(max_update) = self.max_update {
                predicates.push(Expr::column(update_col.as_str()).lt(Expr::Raw(self.dialect().timestamp_value(&max_update))));
            }
        }

        if let Some(pred) = &self.where_clause {
            predicates.push(Expr::Raw(format!("({pred})")));
        }

        let table = TableExpr::path(&self.table_path.iter().map(String::as_str).collect::<Vec<_>>());
        if predicates.is_empty() {
            table
        } else {
            table.filter(predicates)
        }
    }

    /// `inclusive_lower`: true for `key_i >= bound`, false for `key_i < bound`.
    ///
    /// Compares the *raw* key column against a variant-typed literal — never
    /// normalizing either side to a string — so integer and UUID keys sort
    /// the way the database's own `>=`/`<` already order them. Normalizing
    /// both sides (as `checksum`/`get_values` do for content comparison)
    /// would turn this into a lexicographic string compare, which is not
    /// order-preserving for integers (`'20' > '101'`).
    fn key_bound_predicate(column: &str, bound: &KeyValue, inclusive_lower: bool) -> Expr {
        let column_expr = Expr::column(column);
        let literal = match bound {
            KeyValue::Int(i) => Expr::int(*i),
            KeyValue::Uuid(u) => Expr::string(u.to_string()),
            KeyValue::Alphanumeric(a) => Expr::string(a.to_string()),
        };
        if inclusive_lower {
            column_expr.ge(literal)
        } else {
            column_expr.lt(literal)
        }
    }

    pub fn make_select(&self) -> TableExpr {
        let columns: Vec<Expr> = self
            .relevant_columns()
            .into_iter()
            .map(|c| {
                let ty = self.column_type(&c);
                Expr::column(c).normalize(ty)
            })
            .collect();
        self.filtered_table().select(columns)
    }

    pub fn count(&self) -> Result<i128, DiffError> {
        let sql = Compiler::new(self.dialect()).compile_root(&self.filtered_table().count());
        let rows = self.database.select_rows(&sql)?;
        Ok(first_int(&rows).unwrap_or(0))
    }

    /// `(count, checksum)`. Empty segment yields `(0, None)`.
    pub fn count_and_checksum(&self) -> Result<(i128, Option<i128>), DiffError> {
        let parts: Vec<(Expr, ColumnType)> = self
            .relevant_columns()
            .into_iter()
            .map(|c| {
                let ty = self.column_type(&c);
                (Expr::column(c), ty)
            })
            .collect();

        let columns = vec![
            Expr::Count { expr: None, distinct: false }.alias("cnt"),
            Expr::row_checksum(parts).sum().alias("checksum"),
        ];
        let select = self.filtered_table().select(columns);
        let sql = Compiler::new(self.dialect()).compile_root(&select);

        let started = Instant::now();
        let rows = self.database.select_rows(&sql)?;
        if started.elapsed().as_secs() > SLOW_QUERY_WARNING_SECS {
            eprintln!(
                "warning: count_and_checksum on `{}` took {}s",
                self.table_path.join("."),
                started.elapsed().as_secs()
            );
        }

        let row = rows.first().ok_or_else(|| DiffError::QueryExecution {
            message: "count_and_checksum returned no rows".to_string(),
        })?;
        let count = row_value_to_int(&row[0]).unwrap_or(0);
        if count == 0 {
            return Ok((0, None));
        }
        let checksum = row_value_to_int(&row[1]);
        Ok((count, checksum))
    }

    /// `(min_vector, max_vector)` over the key columns, from normalized values.
    pub fn query_key_range(&self) -> Result<(Vector, Vector), DiffError> {
        let mut columns = Vec::new();
        for key_col in &self.key_columns {
            let ty = self.column_type(key_col);
            let normalized = Expr::column(key_col.as_str()).normalize(ty);
            columns.push(Expr::Func { name: "MIN", args: vec![normalized.clone()] }.alias(format!("{key_col}_min")));
            columns.push(Expr::Func { name: "MAX", args: vec![normalized] }.alias(format!("{key_col}_max")));
        }
        let select = self.filtered_table().select(columns);
        let sql = Compiler::new(self.dialect()).compile_root(&select);
        let rows = self.database.select_rows(&sql)?;
        let row = rows.first().ok_or_else(|| DiffError::EmptyTable { table: self.table_path.join(".") })?;

        let mut mins = Vec::with_capacity(self.key_columns.len());
        let mut maxs = Vec::with_capacity(self.key_columns.len());
        for (i, key_col) in self.key_columns.iter().enumerate() {
            let ty = self.column_type(key_col);
            let min_cell = &row[i * 2];
            let max_cell = &row[i * 2 + 1];
            if matches!(min_cell, RowValue::Null) || matches!(max_cell, RowValue::Null) {
                return Err(DiffError::EmptyTable { table: self.table_path.join(".") });
            }
            mins.push(parse_key_value(&min_cell.to_string(), &ty)?);
            maxs.push(parse_key_value(&max_cell.to_string(), &ty)?);
        }
        Ok((Vector(mins), Vector(maxs)))
    }

    /// The normalized rows for every `relevant_column`, for a leaf-level local diff.
    pub fn get_values(&self) -> Result<Vec<Vec<String>>, DiffError> {
        let sql = Compiler::new(self.dialect()).compile_root(&self.make_select());
        let rows = self.database.select_rows(&sql)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.to_string()).collect())
            .collect())
    }

    /// Per-dimension split points between `min_key` and `max_key`, producing
    /// roughly `count` boxes once meshed. Each inner vec starts at that
    /// dimension's min, ends at its max, with evenly spaced points between.
    pub fn choose_checkpoints(&self, count: usize) -> Result<Vec<Vec<KeyValue>>, DiffError> {
        let min_key = self.min_key.as_ref().ok_or_else(|| DiffError::Configuration {
            message: "choose_checkpoints requires a bounded segment".to_string(),
        })?;
        let max_key = self.max_key.as_ref().ok_or_else(|| DiffError::Configuration {
            message: "choose_checkpoints requires a bounded segment".to_string(),
        })?;

        let dims = min_key.dims();
        let per_dim = ((count as f64).powf(1.0 / dims as f64).round() as usize).max(2);

        let mut result = Vec::with_capacity(dims);
        for i in 0..dims {
            let interior = crate::key::split_range(&min_key.0[i], &max_key.0[i], per_dim)?;
            let mut boundaries = Vec::with_capacity(interior.len() + 2);
            boundaries.push(min_key.0[i].clone());
            boundaries.extend(interior);
            boundaries.push(max_key.0[i].clone());
            result.push(boundaries);
        }
        Ok(result)
    }

    /// Cartesian mesh of adjacent checkpoint pairs, one child segment per box.
    pub fn segment_by_checkpoints(&self, checkpoints: &[Vec<KeyValue>]) -> Result<Vec<TableSegment>, DiffError> {
        let dims = checkpoints.len();
        let segment_counts: Vec<usize> = checkpoints.iter().map(|b| b.len().saturating_sub(1)).collect();
        let total: usize = segment_counts.iter().product();

        let mut children = Vec::with_capacity(total);
        let mut indices = vec![0usize; dims];
        for _ in 0..total {
            let mut min_vals = Vec::with_capacity(dims);
            let mut max_vals = Vec::with_capacity(dims);
            for d in 0..dims {
                min_vals.push(checkpoints[d][indices[d]].clone());
                max_vals.push(checkpoints[d][indices[d] + 1].clone());
            }
            children.push(self.with_bounds(Vector(min_vals), Vector(max_vals))?);

            for d in (0..dims).rev() {
                indices[d] += 1;
                if indices[d] < segment_counts[d] {
                    break;
                }
                indices[d] = 0;
            }
        }
        Ok(children)
    }

    /// Upper bound on row count: product of per-dimension key spans.
    pub fn approximate_size(&self) -> Result<u128, DiffError> {
        let min_key = self.min_key.as_ref().ok_or_else(|| DiffError::Configuration {
            message: "approximate_size requires a bounded segment".to_string(),
        })?;
        let max_key = self.max_key.as_ref().ok_or_else(|| DiffError::Configuration {
            message: "approximate_size requires a bounded segment".to_string(),
        })?;

        let mut product: u128 = 1;
        for (lo, hi) in min_key.0.iter().zip(max_key.0.iter()) {
            product = product.saturating_mul(key_span(lo, hi)?);
        }
        Ok(product)
    }
}

fn key_span(lo: &KeyValue, hi: &KeyValue) -> Result<u128, DiffError> {
    match (lo, hi) {
        (KeyValue::Int(a), KeyValue::Int(b)) => Ok((b - a).unsigned_abs()),
        (KeyValue::Uuid(a), KeyValue::Uuid(b)) => Ok(b.sub(a)),
        (KeyValue::Alphanumeric(a), KeyValue::Alphanumeric(b)) => Ok(b.sub(a)),
        _ => Err(DiffError::KeyTypeMismatch { column: String::new() }),
    }
}

fn parse_key_value(text: &str, ty: &ColumnType) -> Result<KeyValue, DiffError> {
    match ty.key_class() {
        Some("integer") => text
            .parse::<i128>()
            .map(KeyValue::Int)
            .map_err(|_| DiffError::InvalidKeyValue { value: text.to_string() }),
        Some("uuid") => ArithUuid::parse(text).map(KeyValue::Uuid),
        Some("alphanumeric") => {
            let max_len = match ty {
                ColumnType::StringAlphanumeric { max_len, .. } => *max_len,
                _ => text.chars().count(),
            };
            ArithAlphanumeric::parse(text, max_len).map(KeyValue::Alphanumeric)
        }
        _ => Err(DiffError::KeyTypeMismatch { column: String::new() }),
    }
}

fn first_int(rows: &[Vec<RowValue>]) -> Option<i128> {
    rows.first().and_then(|r| r.first()).and_then(row_value_to_int)
}

fn row_value_to_int(v: &RowValue) -> Option<i128> {
    match v {
        RowValue::Int(i) => Some(*i),
        RowValue::Float(f) => Some(*f as i128),
        RowValue::Text(s) => s.parse().ok(),
        RowValue::Null | RowValue::Bool(_) => None,
    }
}
