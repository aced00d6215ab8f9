//! Expression and table node definitions. See `data_diff/sqeleton/queries/ast_classes.py`
//! for the builder this enum collapses into a single closed tree.

use super::{Compiler, Literal};
use crate::tableschema::ColumnType;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    /// A reference to `table_alias.column_name`; `table_alias` is `None`
    /// when there's no ambiguity (a single table in scope).
    Column {
        table_alias: Option<String>,
        name: String,
    },
    Alias(Box<Expr>, String),
    BinOp {
        op: &'static str,
        args: Vec<Expr>,
    },
    UnaryOp {
        op: &'static str,
        expr: Box<Expr>,
    },
    IsDistinctFrom {
        a: Box<Expr>,
        a_type: ColumnType,
        b: Box<Expr>,
        b_type: ColumnType,
    },
    Func {
        name: &'static str,
        args: Vec<Expr>,
    },
    Count {
        expr: Option<Box<Expr>>,
        distinct: bool,
    },
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        target_type: String,
    },
    CaseWhen {
        cases: Vec<(Expr, Expr)>,
        else_expr: Option<Box<Expr>>,
    },
    IsNull(Box<Expr>),
    Random,
    CurrentTimestamp,
    /// NULL-safe concatenation: each part is coalesced to `'<null>'` before
    /// joining, separated by `sep` if given. This is how checksum inputs are
    /// built so a NULL column doesn't silently erase a whole row's digest.
    Concat {
        exprs: Vec<Expr>,
        sep: Option<&'static str>,
    },
    /// Normalize each `(expr, type)` pair to a canonical string, NULL-safe
    /// concatenate them in order, then md5-hash the row down to a signed
    /// bigint via the active dialect's `md5_as_int`. A single pair yields a
    /// per-column checksum; the full `relevant_columns` list yields the
    /// per-row checksum `count_and_checksum` sums over.
    Checksum {
        parts: Vec<(Box<Expr>, ColumnType)>,
    },
    /// Normalize `expr` (of type `ty`) to its canonical comparison string,
    /// without hashing — used for `get_values()` and key-range queries.
    Normalize {
        expr: Box<Expr>,
        ty: ColumnType,
    },
    /// Raw, already-compiled SQL text spliced in verbatim.
    Raw(String),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column {
            table_alias: None,
            name: name.into(),
        }
    }

    pub fn aliased_column(table_alias: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column {
            table_alias: Some(table_alias.into()),
            name: name.into(),
        }
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        Expr::Alias(Box::new(self), name.into())
    }

    pub fn eq(self, other: Expr) -> Self {
        Expr::BinOp {
            op: "=",
            args: vec![self, other],
        }
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::BinOp {
            op: "AND",
            args: vec![self, other],
        }
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::BinOp {
            op: "OR",
            args: vec![self, other],
        }
    }

    pub fn gt(self, other: Expr) -> Self {
        Expr::BinOp {
            op: ">",
            args: vec![self, other],
        }
    }

    pub fn lt(self, other: Expr) -> Self {
        Expr::BinOp {
            op: "<",
            args: vec![self, other],
        }
    }

    pub fn ge(self, other: Expr) -> Self {
        Expr::BinOp {
            op: ">=",
            args: vec![self, other],
        }
    }

    pub fn le(self, other: Expr) -> Self {
        Expr::BinOp {
            op: "<=",
            args: vec![self, other],
        }
    }

    pub fn sum(self) -> Self {
        Expr::Func {
            name: "SUM",
            args: vec![self],
        }
    }

    pub fn is_null(self) -> Self {
        Expr::IsNull(Box::new(self))
    }

    pub fn is_distinct_from(self, other: Expr, self_type: ColumnType, other_type: ColumnType) -> Self {
        Expr::IsDistinctFrom {
            a: Box::new(self),
            a_type: self_type,
            b: Box::new(other),
            b_type: other_type,
        }
    }

    pub fn int(n: i128) -> Self {
        Expr::Literal(Literal::Int(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(s.into()))
    }

    pub fn checksum(self, ty: ColumnType) -> Self {
        Expr::Checksum {
            parts: vec![(Box::new(self), ty)],
        }
    }

    pub fn normalize(self, ty: ColumnType) -> Self {
        Expr::Normalize {
            expr: Box::new(self),
            ty,
        }
    }

    /// Build the per-row checksum over several `(column_expr, type)` pairs,
    /// in `relevant_columns` order.
    pub fn row_checksum(parts: Vec<(Expr, ColumnType)>) -> Self {
        Expr::Checksum {
            parts: parts.into_iter().map(|(e, t)| (Box::new(e), t)).collect(),
        }
    }

    pub fn compile(&self, c: &mut Compiler) -> String {
        match self {
            Expr::Literal(lit) => super::literal(lit),
            Expr::Column { table_alias, name } => match table_alias {
                Some(alias) if c.in_table_context() => {
                    format!("{}.{}", c.quote(alias), c.quote(name))
                }
                _ => c.quote(name),
            },
            Expr::Alias(expr, name) => format!("{} AS {}", c.compile_expr(expr), c.quote(name)),
            Expr::BinOp { op, args } => {
                let parts: Vec<String> = args.iter().map(|a| c.compile_expr(a)).collect();
                format!("({})", parts.join(&format!(" {op} ")))
            }
            Expr::UnaryOp { op, expr } => format!("({op}{})", c.compile_expr(expr)),
            Expr::IsDistinctFrom { a, a_type, b, b_type } => {
                let a_sql = c.dialect.normalize_value_by_type(&c.compile_expr(a), a_type);
                let b_sql = c.dialect.normalize_value_by_type(&c.compile_expr(b), b_type);
                c.dialect.is_distinct_from(&a_sql, &b_sql)
            }
            Expr::Func { name, args } => {
                let parts: Vec<String> = args.iter().map(|a| c.compile_expr(a)).collect();
                format!("{name}({})", parts.join(", "))
            }
            Expr::Count { expr, distinct } => {
                let inner = expr
                    .as_ref()
                    .map(|e| c.compile_expr(e))
                    .unwrap_or_else(|| "*".to_string());
                if *distinct {
                    format!("count(distinct {inner})")
                } else {
                    format!("count({inner})")
                }
            }
            Expr::In { expr, list } => {
                let inner = c.compile_expr(expr);
                let elems: Vec<String> = list.iter().map(|e| c.compile_expr(e)).collect();
                format!("({inner} IN ({}))", elems.join(", "))
            }
            Expr::Cast { expr, target_type } => {
                format!("cast({} as {target_type})", c.compile_expr(expr))
            }
            Expr::CaseWhen { cases, else_expr } => {
                let when_thens: Vec<String> = cases
                    .iter()
                    .map(|(when, then)| {
                        format!("WHEN {} THEN {}", c.compile_expr(when), c.compile_expr(then))
                    })
                    .collect();
                let else_sql = else_expr
                    .as_ref()
                    .map(|e| format!(" ELSE {}", c.compile_expr(e)))
                    .unwrap_or_default();
                format!("CASE {}{else_sql} END", when_thens.join(" "))
            }
            Expr::IsNull(expr) => format!("({} IS NULL)", c.compile_expr(expr)),
            Expr::Random => c.dialect.random(),
            Expr::CurrentTimestamp => c.dialect.current_timestamp(),
            Expr::Concat { exprs, sep } => {
                let items: Vec<String> = exprs
                    .iter()
                    .map(|e| {
                        let inner = c.compile_expr(e);
                        let as_string = c.dialect.to_string_expr(&inner);
                        format!("coalesce({as_string}, '<null>')")
                    })
                    .collect();
                if items.len() == 1 {
                    return items[0].clone();
                }
                let items = match sep {
                    Some(sep) => {
                        let mut joined = Vec::with_capacity(items.len() * 2 - 1);
                        for (i, item) in items.into_iter().enumerate() {
                            if i > 0 {
                                joined.push(format!("'{sep}'"));
                            }
                            joined.push(item);
                        }
                        joined
                    }
                    None => items,
                };
                c.dialect.concat(&items)
            }
            Expr::Normalize { expr, ty } => {
                let inner = c.compile_expr(expr);
                c.dialect.normalize_value_by_type(&inner, ty)
            }
            Expr::Checksum { parts } => {
                let coalesced: Vec<String> = parts
                    .iter()
                    .map(|(expr, ty)| {
                        let inner = c.compile_expr(expr);
                        let normalized = c.dialect.normalize_value_by_type(&inner, ty);
                        format!("coalesce({normalized}, '<null>')")
                    })
                    .collect();
                let row_string = if coalesced.len() == 1 {
                    coalesced.into_iter().next().unwrap()
                } else {
                    let mut joined = Vec::with_capacity(coalesced.len() * 2 - 1);
                    for (i, part) in coalesced.into_iter().enumerate() {
                        if i > 0 {
                            joined.push("'|'".to_string());
                        }
                        joined.push(part);
                    }
                    c.dialect.concat(&joined)
                };
                c.dialect.md5_as_int(&row_string)
            }
            Expr::Raw(code) => code.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableAlias {
    pub table: String,
    pub alias: String,
}

/// Table-valued nodes: everything that can appear after `FROM` or be the
/// root of a compiled statement.
#[derive(Debug, Clone)]
pub enum TableExpr {
    Path(Vec<String>),
    Aliased {
        source: Box<TableExpr>,
        alias: String,
    },
    Select(Box<Select>),
    Join(Box<JoinNode>),
    GroupBy(Box<GroupByNode>),
    TableOp {
        op: &'static str,
        left: Box<TableExpr>,
        right: Box<TableExpr>,
    },
    Cte {
        source: Box<TableExpr>,
        name: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Select {
    pub table: Option<TableExpr>,
    pub columns: Option<Vec<Expr>>,
    pub where_exprs: Vec<Expr>,
    pub group_by_exprs: Vec<Expr>,
    pub having_exprs: Vec<Expr>,
    pub order_by_exprs: Vec<Expr>,
    pub limit: Option<u64>,
    pub distinct: bool,
}

#[derive(Debug, Clone)]
pub struct JoinNode {
    pub tables: Vec<TableExpr>,
    pub op: Option<&'static str>,
    pub on_exprs: Vec<Expr>,
    pub columns: Option<Vec<Expr>>,
}

#[derive(Debug, Clone)]
pub struct GroupByNode {
    pub table: TableExpr,
    pub keys: Vec<Expr>,
    pub values: Vec<Expr>,
    pub having_exprs: Vec<Expr>,
}

impl TableExpr {
    pub fn path(parts: &[&str]) -> Self {
        TableExpr::Path(parts.iter().map(|s| s.to_string()).collect())
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        TableExpr::Aliased {
            source: Box::new(self),
            alias: name.into(),
        }
    }

    pub fn select(self, columns: Vec<Expr>) -> Self {
        TableExpr::Select(Box::new(Select {
            table: Some(self),
            columns: Some(columns),
            ..Default::default()
        }))
    }

    pub fn filter(self, where_exprs: Vec<Expr>) -> Self {
        match self {
            TableExpr::Select(mut sel) if sel.columns.is_none() && !sel.where_exprs.is_empty() => {
                sel.where_exprs.extend(where_exprs);
                TableExpr::Select(sel)
            }
            other => TableExpr::Select(Box::new(Select {
                table: Some(other),
                where_exprs,
                ..Default::default()
            })),
        }
    }

    pub fn order_by(self, order_by_exprs: Vec<Expr>) -> Self {
        TableExpr::Select(Box::new(Select {
            table: Some(self),
            order_by_exprs,
            ..Default::default()
        }))
    }

    pub fn limit(self, limit: u64) -> Self {
        TableExpr::Select(Box::new(Select {
            table: Some(self),
            limit: Some(limit),
            ..Default::default()
        }))
    }

    pub fn join(self, other: TableExpr, op: Option<&'static str>) -> JoinNode {
        JoinNode {
            tables: vec![self, other],
            op,
            on_exprs: Vec::new(),
            columns: None,
        }
    }

    pub fn count(self) -> Self {
        TableExpr::Select(Box::new(Select {
            table: Some(self),
            columns: Some(vec![Expr::Count {
                expr: None,
                distinct: false,
            }]),
            ..Default::default()
        }))
    }

    pub fn union_all(self, other: TableExpr) -> Self {
        TableExpr::TableOp {
            op: "UNION ALL",
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn union(self, other: TableExpr) -> Self {
        TableExpr::TableOp {
            op: "UNION",
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn cte(self, name: impl Into<String>) -> Self {
        TableExpr::Cte {
            source: Box::new(self),
            name: name.into(),
        }
    }

    pub fn compile(&self, c: &mut Compiler) -> String {
        match self {
            TableExpr::Path(path) => path.iter().map(|p| c.quote(p)).collect::<Vec<_>>().join("."),
            TableExpr::Aliased { source, alias } => {
                format!("{} {}", c.compile_table(source), c.quote(alias))
            }
            TableExpr::Select(sel) => sel.compile(c),
            TableExpr::Join(join) => join.compile(c),
            TableExpr::GroupBy(gb) => gb.compile(c),
            TableExpr::TableOp { op, left, right } => {
                let prev_select = c.in_select;
                c.in_select = false;
                let left_sql = c.compile_table(left);
                let right_sql = c.compile_table(right);
                c.in_select = prev_select;
                let table_expr = format!("{left_sql} {op} {right_sql}");
                c.wrap_nested(table_expr)
            }
            TableExpr::Cte { source, name } => {
                let compiled = c.with_fresh_table_context(|c| c.compile_table(source));
                c.register_subquery(name.clone(), compiled);
                name.clone()
            }
        }
    }
}

impl Select {
    pub fn compile(&self, c: &mut Compiler) -> String {
        let inner = c.with_select_context(|c| self.compile_inner(c));
        c.wrap_nested(inner)
    }

    fn compile_inner(&self, c: &mut Compiler) -> String {
        let columns = match &self.columns {
            Some(cols) if !cols.is_empty() => {
                cols.iter().map(|e| c.compile_expr(e)).collect::<Vec<_>>().join(", ")
            }
            _ => "*".to_string(),
        };
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let mut sql = format!("SELECT {distinct}{columns}");

        if let Some(table) = &self.table {
            sql.push_str(" FROM ");
            sql.push_str(&c.compile_table(table));
        }

        if !self.where_exprs.is_empty() {
            let parts: Vec<String> = self.where_exprs.iter().map(|e| c.compile_expr(e)).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&parts.join(" AND "));
        }

        if !self.group_by_exprs.is_empty() {
            let parts: Vec<String> = self.group_by_exprs.iter().map(|e| c.compile_expr(e)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&parts.join(", "));
        }

        if !self.having_exprs.is_empty() {
            let parts: Vec<String> = self.having_exprs.iter().map(|e| c.compile_expr(e)).collect();
            sql.push_str(" HAVING ");
            sql.push_str(&parts.join(" AND "));
        }

        if !self.order_by_exprs.is_empty() {
            let parts: Vec<String> = self.order_by_exprs.iter().map(|e| c.compile_expr(e)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&c.dialect.offset_limit(None, Some(limit)));
        }

        sql
    }
}

impl JoinNode {
    pub fn on(mut self, expr: Expr) -> Self {
        self.on_exprs.push(expr);
        self
    }

    pub fn select(mut self, columns: Vec<Expr>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn into_table(self) -> TableExpr {
        TableExpr::Join(Box::new(self))
    }

    pub fn compile(&self, c: &mut Compiler) -> String {
        let aliases: Vec<TableAlias> = self
            .tables
            .iter()
            .map(|t| match t {
                TableExpr::Aliased { alias, .. } => TableAlias {
                    table: String::new(),
                    alias: alias.clone(),
                },
                _ => TableAlias {
                    table: String::new(),
                    alias: c.new_unique_name("t"),
                },
            })
            .collect();

        let named_tables: Vec<TableExpr> = self
            .tables
            .iter()
            .cloned()
            .zip(aliases.iter())
            .map(|(t, a)| match t {
                TableExpr::Aliased { .. } => t,
                other => other.alias(a.alias.clone()),
            })
            .collect();

        c.with_join_context(aliases, |c| {
            let op = self.op.map(|o| format!(" {o} JOIN ")).unwrap_or_else(|| " JOIN ".to_string());
            let joined = named_tables
                .iter()
                .map(|t| c.compile_table(t))
                .collect::<Vec<_>>()
                .join(&op);

            let joined = if !self.on_exprs.is_empty() {
                let on: Vec<String> = self.on_exprs.iter().map(|e| c.compile_expr(e)).collect();
                format!("{joined} ON {}", on.join(" AND "))
            } else {
                joined
            };

            let columns = match &self.columns {
                Some(cols) => cols.iter().map(|e| c.compile_expr(e)).collect::<Vec<_>>().join(", "),
                None => "*".to_string(),
            };
            let sql = format!("SELECT {columns} FROM {joined}");
            c.wrap_nested(sql)
        })
    }
}

impl GroupByNode {
    pub fn compile(&self, c: &mut Compiler) -> String {
        let keys: Vec<String> = (1..=self.keys.len()).map(|i| i.to_string()).collect();
        let mut columns = self.keys.clone();
        columns.extend(self.values.clone());
        let columns_str = columns.iter().map(|e| c.compile_expr(e)).collect::<Vec<_>>().join(", ");
        let having_str = if !self.having_exprs.is_empty() {
            let parts: Vec<String> = self.having_exprs.iter().map(|e| c.compile_expr(e)).collect();
            format!(" HAVING {}", parts.join(" AND "))
        } else {
            String::new()
        };
        let from_sql = c.with_select_context(|c| c.compile_table(&self.table));
        let sql = format!(
            "SELECT {columns_str} FROM {from_sql} GROUP BY {}{having_str}",
            keys.join(", ")
        );
        c.wrap_nested(sql)
    }
}

// DDL statements.

#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable {
        path: Vec<String>,
        columns: Vec<(String, String)>,
        if_not_exists: bool,
        primary_keys: Vec<String>,
    },
    DropTable {
        path: Vec<String>,
        if_exists: bool,
    },
    TruncateTable {
        path: Vec<String>,
    },
    InsertToTable {
        path: Vec<String>,
        select: Box<TableExpr>,
        columns: Option<Vec<String>>,
    },
    Commit,
}

impl Statement {
    pub fn compile(&self, c: &mut Compiler) -> String {
        match self {
            Statement::CreateTable {
                path,
                columns,
                if_not_exists,
                primary_keys,
            } => {
                let ne = if *if_not_exists { "IF NOT EXISTS " } else { "" };
                let path_sql = path.iter().map(|p| c.quote(p)).collect::<Vec<_>>().join(".");
                let cols_sql = columns
                    .iter()
                    .map(|(name, ty)| format!("{} {ty}", c.quote(name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let pk_sql = if !primary_keys.is_empty() {
                    format!(", PRIMARY KEY ({})", primary_keys.join(", "))
                } else {
                    String::new()
                };
                format!("CREATE TABLE {ne}{path_sql}({cols_sql}{pk_sql})")
            }
            Statement::DropTable { path, if_exists } => {
                let ie = if *if_exists { "IF EXISTS " } else { "" };
                let path_sql = path.iter().map(|p| c.quote(p)).collect::<Vec<_>>().join(".");
                format!("DROP TABLE {ie}{path_sql}")
            }
            Statement::TruncateTable { path } => {
                let path_sql = path.iter().map(|p| c.quote(p)).collect::<Vec<_>>().join(".");
                format!("TRUNCATE TABLE {path_sql}")
            }
            Statement::InsertToTable { path, select, columns } => {
                let path_sql = path.iter().map(|p| c.quote(p)).collect::<Vec<_>>().join(".");
                let cols_sql = columns
                    .as_ref()
                    .map(|cols| format!("({})", cols.iter().map(|c2| c.quote(c2)).collect::<Vec<_>>().join(", ")))
                    .unwrap_or_default();
                format!("INSERT INTO {path_sql}{cols_sql} {}", c.compile_table(select))
            }
            Statement::Commit => "COMMIT".to_string(),
        }
    }
}
