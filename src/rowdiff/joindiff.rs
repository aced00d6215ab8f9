//! Same-database comparison via a single OUTER JOIN query.
//!
//! Grounded on `HashDiffer`'s split between validation and execution, but the
//! data-comparison itself is pushed entirely into one SQL statement: every
//! column's `IS DISTINCT FROM` flag is computed server-side so only rows that
//! actually differ (or are exclusive to one side) cross the network.

use crate::database::RowValue;
use crate::differ::DiffWarning;
use crate::error::DiffError;
use crate::query::{Compiler, Expr, TableExpr};
use crate::rowdiff::{DiffRow, Sign};
use crate::segment::TableSegment;
use crate::tableschema::ColumnType;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct JoinDiffConfig {
    pub skip_null_keys: bool,
    pub materialize_to_table: Option<Vec<String>>,
}

/// Per-`diff()` call statistics, derived from the rows the main query already
/// returned — no extra aggregate query is needed since every returned row
/// already carries its own exclusivity and per-column diff flags.
#[derive(Debug, Clone, Default)]
pub struct JoinDiffStats {
    pub rows_a: i128,
    pub rows_b: i128,
    pub exclusive_a: i128,
    pub exclusive_b: i128,
    pub updated: i128,
    pub unchanged: i128,
    pub column_diff_counts: BTreeMap<String, i128>,
}

pub struct JoinDiffer {
    config: JoinDiffConfig,
    warnings: Mutex<Vec<DiffWarning>>,
    stats: Mutex<Option<JoinDiffStats>>,
}

impl JoinDiffer {
    pub fn new(config: JoinDiffConfig) -> Result<Self, DiffError> {
        Ok(Self {
            config,
            warnings: Mutex::new(Vec::new()),
            stats: Mutex::new(None),
        })
    }

    pub fn warnings(&self) -> Vec<DiffWarning> {
        self.warnings.lock().expect("joindiffer warnings mutex poisoned").clone()
    }

    pub fn stats(&self) -> Option<JoinDiffStats> {
        self.stats.lock().expect("joindiffer stats mutex poisoned").clone()
    }

    fn warn(&self, table: Option<String>, message: String) {
        self.warnings
            .lock()
            .expect("joindiffer warnings mutex poisoned")
            .push(DiffWarning { table, message });
    }

    pub fn diff(&self, a: TableSegment, b: TableSegment) -> Result<Vec<DiffRow>, DiffError> {
        if !Arc::ptr_eq(a.database(), b.database()) {
            return Err(DiffError::Configuration {
                message: "joindiff requires both segments to share one Database".to_string(),
            });
        }

        let (a, warns_a) = a.with_schema()?;
        let (b, warns_b) = b.with_schema()?;
        for w in warns_a.into_iter().chain(warns_b) {
            self.warn(w.table, w.message);
        }
        let (a, b, reconcile_warnings) = crate::rowdiff::validate_relevant_columns(a, b)?;
        for w in reconcile_warnings {
            self.warn(w.table, w.message);
        }

        for (side, seg) in [("left", &a), ("right", &b)] {
            let (total, distinct) = duplicate_key_count(seg)?;
            if total != distinct {
                return Err(DiffError::DuplicateKey {
                    table: format!("{} ({side})", seg.table_path().join(".")),
                    columns: seg.key_columns().to_vec(),
                });
            }
            let nulls = null_key_count(seg)?;
            if nulls > 0 {
                if self.config.skip_null_keys {
                    self.warn(
                        Some(seg.table_path().join(".")),
                        format!("{nulls} row(s) with a null key column excluded from the diff ({side} side)"),
                    );
                } else {
                    return Err(DiffError::NullKey {
                        table: seg.table_path().join("."),
                        columns: seg.key_columns().to_vec(),
                    });
                }
            }
        }

        let relevant = a.relevant_columns();
        let key_len = a.key_columns().len();
        let value_cols: Vec<String> = relevant[key_len..].to_vec();

        let table = all_rows_table(&a, &b, &relevant, &value_cols);
        let cte = table.cte("all_rows");
        let predicate = diff_predicate(&value_cols);
        let filtered = cte.filter(vec![predicate]);

        let sql = Compiler::new(a.dialect()).compile_root(&filtered);
        let rows = a.database().select_rows(&sql)?;

        let mut out = Vec::with_capacity(rows.len() * 2);
        let mut exclusive_a = 0i128;
        let mut exclusive_b = 0i128;
        let mut updated = 0i128;
        let mut column_diff_counts: BTreeMap<String, i128> = value_cols.iter().map(|c| (c.clone(), 0)).collect();

        let value_offset = 2 + relevant.len() * 2;
        for row in rows {
            let is_excl_a = row_value_truthy(&row[0]);
            let is_excl_b = row_value_truthy(&row[1]);

            if is_excl_a && is_excl_b {
                if self.config.skip_null_keys {
                    continue;
                }
                return Err(DiffError::NullKey {
                    table: a.table_path().join("."),
                    columns: a.key_columns().to_vec(),
                });
            }

            for (j, col) in value_cols.iter().enumerate() {
                if row_value_truthy(&row[value_offset + j]) {
                    *column_diff_counts.get_mut(col).expect("column present") += 1;
                }
            }

            if is_excl_a {
                exclusive_a += 1;
            } else if is_excl_b {
                exclusive_b += 1;
            } else {
                updated += 1;
            }

            let mut a_row = Vec::with_capacity(relevant.len());
            let mut b_row = Vec::with_capacity(relevant.len());
            for i in 0..relevant.len() {
                a_row.push(row[2 + i * 2].to_string());
                b_row.push(row[2 + i * 2 + 1].to_string());
            }

            if !is_excl_b {
                out.push((Sign::Minus, a_row.clone()));
            }
            if !is_excl_a {
                out.push((Sign::Plus, b_row.clone()));
            }

            if let Some(path) = &self.config.materialize_to_table {
                if !is_excl_b {
                    materialize_row(a.database().as_ref(), a.dialect(), path, &relevant, Sign::Minus, &a_row)?;
                }
                if !is_excl_a {
                    materialize_row(a.database().as_ref(), a.dialect(), path, &relevant, Sign::Plus, &b_row)?;
                }
            }
        }

        let rows_a = a.count()?;
        let rows_b = b.count()?;
        let unchanged = (rows_a - exclusive_a - updated).max(0);

        *self.stats.lock().expect("joindiffer stats mutex poisoned") = Some(JoinDiffStats {
            rows_a,
            rows_b,
            exclusive_a,
            exclusive_b,
            updated,
            unchanged,
            column_diff_counts,
        });

        Ok(out)
    }
}

fn row_value_truthy(v: &RowValue) -> bool {
    match v {
        RowValue::Bool(b) => *b,
        RowValue::Int(i) => *i != 0,
        RowValue::Float(f) => *f != 0.0,
        RowValue::Text(s) => matches!(s.as_str(), "1" | "t" | "true" | "TRUE" | "T"),
        RowValue::Null => false,
    }
}

fn is_null_and_chain(alias: &str, keys: &[String]) -> Expr {
    let mut acc: Option<Expr> = None;
    for k in keys {
        let e = Expr::aliased_column(alias, k.as_str()).is_null();
        acc = Some(match acc {
            Some(prev) => prev.and(e),
            None => e,
        });
    }
    acc.expect("key_columns is non-empty")
}

fn int_flag(cond: Expr) -> Expr {
    Expr::CaseWhen {
        cases: vec![(cond, Expr::int(1))],
        else_expr: Some(Box::new(Expr::int(0))),
    }
}

/// Build the projected join: `is_exclusive_a`, `is_exclusive_b`, an `a_<col>`
/// / `b_<col>` normalized pair per relevant column, and a `diff_<col>` 0/1
/// flag per non-key column. Emulates `FULL OUTER JOIN` as `LEFT UNION RIGHT`
/// (deduplicating via `UNION`, not `UNION ALL`) for dialects that lack it.
fn all_rows_table(a: &TableSegment, b: &TableSegment, relevant: &[String], value_cols: &[String]) -> TableExpr {
    if a.dialect().supports_full_outer_join() {
        one_sided_join(a, b, relevant, value_cols, Some("FULL OUTER"))
    } else {
        let left = one_sided_join(a, b, relevant, value_cols, Some("LEFT"));
        let right = one_sided_join(a, b, relevant, value_cols, Some("RIGHT"));
        left.union(right)
    }
}

fn one_sided_join(
    a: &TableSegment,
    b: &TableSegment,
    relevant: &[String],
    value_cols: &[String],
    op: Option<&'static str>,
) -> TableExpr {
    let a_table = a.filtered_table().alias("a");
    let b_table = b.filtered_table().alias("b");
    let mut join = a_table.join(b_table, op);
    for key in a.key_columns() {
        join = join.on(Expr::aliased_column("a", key.as_str()).eq(Expr::aliased_column("b", key.as_str())));
    }

    let mut columns = vec![
        int_flag(is_null_and_chain("b", a.key_columns())).alias("is_exclusive_a"),
        int_flag(is_null_and_chain("a", a.key_columns())).alias("is_exclusive_b"),
    ];

    for col in relevant {
        let ty: ColumnType = a.column_type(col);
        columns.push(Expr::aliased_column("a", col.as_str()).normalize(ty.clone()).alias(format!("a_{col}")));
        columns.push(Expr::aliased_column("b", col.as_str()).normalize(ty).alias(format!("b_{col}")));
    }

    for col in value_cols {
        let ty = a.column_type(col);
        let distinct = Expr::aliased_column("a", col.as_str()).is_distinct_from(
            Expr::aliased_column("b", col.as_str()),
            ty.clone(),
            ty,
        );
        columns.push(int_flag(distinct).alias(format!("diff_{col}")));
    }

    join.select(columns).into_table()
}

fn diff_predicate(value_cols: &[String]) -> Expr {
    let mut predicate = Expr::column("is_exclusive_a").eq(Expr::int(1)).or(Expr::column("is_exclusive_b").eq(Expr::int(1)));
    for col in value_cols {
        predicate = predicate.or(Expr::column(format!("diff_{col}")).eq(Expr::int(1)));
    }
    predicate
}

fn duplicate_key_count(seg: &TableSegment) -> Result<(i128, i128), DiffError> {
    let key_exprs: Vec<Expr> = seg
        .key_columns()
        .iter()
        .map(|k| Expr::column(k.as_str()).normalize(seg.column_type(k)))
        .collect();
    let concat = Expr::Concat { exprs: key_exprs, sep: Some("|") };
    let columns = vec![
        Expr::Count { expr: None, distinct: false }.alias("total"),
        Expr::Count { expr: Some(Box::new(concat)), distinct: true }.alias("distinct_total"),
    ];
    let select = seg.filtered_table().select(columns);
    let sql = Compiler::new(seg.dialect()).compile_root(&select);
    let rows = seg.database().select_rows(&sql)?;
    let row = rows.first().ok_or_else(|| DiffError::QueryExecution {
        message: "duplicate-key check returned no rows".to_string(),
    })?;
    Ok((row_value_to_int(&row[0]), row_value_to_int(&row[1])))
}

fn null_key_count(seg: &TableSegment) -> Result<i128, DiffError> {
    let mut predicate: Option<Expr> = None;
    for key in seg.key_columns() {
        let e = Expr::column(key.as_str()).is_null();
        predicate = Some(match predicate {
            Some(prev) => prev.or(e),
            None => e,
        });
    }
    let predicate = predicate.expect("key_columns is non-empty");
    let select = seg.filtered_table().filter(vec![predicate]).count();
    let sql = Compiler::new(seg.dialect()).compile_root(&select);
    let rows = seg.database().select_rows(&sql)?;
    Ok(rows.first().map(|r| row_value_to_int(&r[0])).unwrap_or(0))
}

fn row_value_to_int(v: &RowValue) -> i128 {
    match v {
        RowValue::Int(i) => *i,
        RowValue::Float(f) => *f as i128,
        RowValue::Text(s) => s.parse().unwrap_or(0),
        RowValue::Bool(b) => *b as i128,
        RowValue::Null => 0,
    }
}

/// Append one diff row to `materialize_to_table`, creating it as `(sign TEXT,
/// <relevant columns> TEXT...)` on first use. The table is not dropped between
/// calls within one `diff()`; callers wanting a clean table should drop it
/// themselves first.
fn materialize_row(
    db: &dyn crate::database::Database,
    dialect: &dyn crate::dialect::Dialect,
    path: &[String],
    relevant: &[String],
    sign: Sign,
    row: &[String],
) -> Result<(), DiffError> {
    use crate::query::ast::Statement;

    let mut columns = vec![("diff_sign".to_string(), "TEXT".to_string())];
    columns.extend(relevant.iter().map(|c| (c.clone(), "TEXT".to_string())));

    let mut compiler = Compiler::new(dialect);
    let create_sql = Statement::CreateTable {
        path: path.to_vec(),
        columns: columns.clone(),
        if_not_exists: true,
        primary_keys: Vec::new(),
    }
    .compile(&mut compiler);
    db.execute(&create_sql)?;

    let mut values = vec![Expr::string(sign.as_char().to_string())];
    values.extend(row.iter().map(|v| Expr::string(v.clone())));
    let literal_row = TableExpr::Select(Box::new(crate::query::ast::Select {
        table: None,
        columns: Some(values),
        ..Default::default()
    }));
    let insert_sql = Statement::InsertToTable {
        path: path.to_vec(),
        select: Box::new(literal_row),
        columns: None,
    }
    .compile(&mut compiler);
    db.execute(&insert_sql)?;
    Ok(())
}
