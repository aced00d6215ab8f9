//! A small dialect-agnostic SQL query builder.
//!
//! Expressions and table nodes are plain enums rather than a trait-object
//! tree: every node this crate ever needs to emit (column refs, checksum
//! exprs, joins, group-bys, DDL) is known up front, so a closed enum walked
//! by [`Compiler::compile`] is simpler than the open `Compilable` hierarchy
//! this is grounded on.

use crate::dialect::Dialect;
use std::collections::BTreeMap;
use std::fmt;

pub mod ast;
pub use ast::*;

/// Per-compile mutable state: alias counter, table context (for qualifying
/// column references inside a join), and any CTEs hoisted out of subqueries.
pub struct Compiler<'d> {
    pub dialect: &'d dyn Dialect,
    counter: u64,
    table_context: Vec<TableAlias>,
    in_select: bool,
    in_join: bool,
    subqueries: BTreeMap<String, String>,
}

impl<'d> Compiler<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            counter: 0,
            table_context: Vec::new(),
            in_select: false,
            in_join: false,
            subqueries: BTreeMap::new(),
        }
    }

    pub fn new_unique_name(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}{}", self.counter)
    }

    pub fn quote(&self, s: &str) -> String {
        self.dialect.quote(s)
    }

    /// Compile a root-level table expression into a full statement, hoisting
    /// any CTEs collected along the way into a leading `WITH` clause.
    pub fn compile_root(&mut self, table: &TableExpr) -> String {
        self.subqueries.clear();
        let body = self.compile_table(table);
        if self.subqueries.is_empty() {
            body
        } else {
            let subq = self
                .subqueries
                .iter()
                .map(|(name, sql)| format!("  {name} AS ({sql})"))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("WITH\n{subq}\n{body}")
        }
    }

    pub fn compile_expr(&mut self, expr: &Expr) -> String {
        expr.compile(self)
    }

    pub fn compile_table(&mut self, table: &TableExpr) -> String {
        table.compile(self)
    }

    pub fn in_table_context(&self) -> bool {
        !self.table_context.is_empty()
    }

    pub fn register_subquery(&mut self, name: String, sql: String) {
        self.subqueries.insert(name, sql);
    }

    /// Compile `f` with an empty table-alias context, as a CTE body sees no
    /// aliases from its enclosing query.
    pub fn with_fresh_table_context<F: FnOnce(&mut Self) -> String>(&mut self, f: F) -> String {
        let saved = std::mem::take(&mut self.table_context);
        let (prev_select, prev_join) = (self.in_select, self.in_join);
        self.in_select = false;
        let out = f(self);
        self.table_context = saved;
        self.in_select = prev_select;
        self.in_join = prev_join;
        out
    }

    fn with_select_context<F: FnOnce(&mut Self) -> String>(&mut self, f: F) -> String {
        let (prev_select, prev_join) = (self.in_select, self.in_join);
        self.in_select = true;
        self.in_join = false;
        let out = f(self);
        self.in_select = prev_select;
        self.in_join = prev_join;
        out
    }

    fn with_join_context<F: FnOnce(&mut Self) -> String>(
        &mut self,
        aliases: Vec<TableAlias>,
        f: F,
    ) -> String {
        let prev_context_len = self.table_context.len();
        let (prev_select, prev_join) = (self.in_select, self.in_join);
        self.table_context.extend(aliases);
        self.in_select = false;
        self.in_join = true;
        let out = f(self);
        self.table_context.truncate(prev_context_len);
        self.in_select = prev_select;
        self.in_join = prev_join;
        out
    }

    fn wrap_nested(&mut self, sql: String) -> String {
        if self.in_select {
            let name = self.new_unique_name("tmp");
            format!("({sql}) {name}")
        } else if self.in_join {
            format!("({sql})")
        } else {
            sql
        }
    }
}

/// Format a literal value the way the compiler would embed it in SQL text.
pub fn literal(value: &Literal) -> String {
    match value {
        Literal::Null => "NULL".to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Str(s) => format!("'{}'", s.replace('\'', "''")),
        Literal::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Int(i128),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", literal(self))
    }
}

