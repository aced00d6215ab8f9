//! SQL migration output for diff results: emits `ALTER TABLE`/`CREATE
//! TABLE`/row-level statements that would bring the old schema and data up to
//! the new one.

use crate::differ::{ColumnInfo, DiffResult};
use crate::parser::SqlDialect;

fn quote_ident(dialect: SqlDialect, name: &str) -> String {
    match dialect {
        SqlDialect::MySql => format!("`{name}`"),
        _ => format!("\"{name}\""),
    }
}

fn column_ddl(dialect: SqlDialect, col: &ColumnInfo) -> String {
    let nullable = if col.is_nullable { "" } else { " NOT NULL" };
    format!("{} {}{}", quote_ident(dialect, &col.name), col.col_type, nullable)
}

/// Format diff result as a sequence of SQL statements.
pub fn format_sql(result: &DiffResult, dialect: SqlDialect) -> String {
    let mut out = String::new();
    out.push_str("-- Generated migration\n");

    if let Some(schema) = &result.schema {
        for table in &schema.tables_added {
            out.push_str(&format!("\nCREATE TABLE {} (\n", quote_ident(dialect, &table.name)));
            let mut lines: Vec<String> = table
                .columns
                .iter()
                .map(|c| format!("  {}", column_ddl(dialect, c)))
                .collect();
            if !table.primary_key.is_empty() {
                let pk_cols: Vec<String> = table
                    .primary_key
                    .iter()
                    .map(|c| quote_ident(dialect, c))
                    .collect();
                lines.push(format!("  PRIMARY KEY ({})", pk_cols.join(", ")));
            }
            out.push_str(&lines.join(",\n"));
            out.push_str("\n);\n");
        }

        for table_name in &schema.tables_removed {
            out.push_str(&format!("\nDROP TABLE {};\n", quote_ident(dialect, table_name)));
        }

        for modification in &schema.tables_modified {
            let table_ident = quote_ident(dialect, &modification.table_name);

            for col in &modification.columns_added {
                out.push_str(&format!(
                    "\nALTER TABLE {table_ident} ADD COLUMN {};\n",
                    column_ddl(dialect, col)
                ));
            }

            for col in &modification.columns_removed {
                out.push_str(&format!(
                    "\nALTER TABLE {table_ident} DROP COLUMN {};\n",
                    quote_ident(dialect, &col.name)
                ));
            }

            for change in &modification.columns_modified {
                if let Some(new_type) = &change.new_type {
                    out.push_str(&format!(
                        "\nALTER TABLE {table_ident} ALTER COLUMN {} TYPE {new_type};\n",
                        quote_ident(dialect, &change.name)
                    ));
                }
                if let Some(new_nullable) = change.new_nullable {
                    let clause = if new_nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
                    out.push_str(&format!(
                        "\nALTER TABLE {table_ident} ALTER COLUMN {} {clause};\n",
                        quote_ident(dialect, &change.name)
                    ));
                }
            }
        }
    }

    if let Some(data) = &result.data {
        let mut table_names: Vec<&String> = data.tables.keys().collect();
        table_names.sort();
        for table_name in table_names {
            let diff = &data.tables[table_name];
            let table_ident = quote_ident(dialect, table_name);
            if diff.added_count > 0 {
                out.push_str(&format!(
                    "\n-- {} row(s) added to {table_ident}\n",
                    diff.added_count
                ));
                for pk in &diff.sample_added_pks {
                    out.push_str(&format!("-- INSERT INTO {table_ident} ... ; -- pk={pk}\n"));
                }
            }
            if diff.removed_count > 0 {
                out.push_str(&format!(
                    "\n-- {} row(s) removed from {table_ident}\n",
                    diff.removed_count
                ));
                for pk in &diff.sample_removed_pks {
                    out.push_str(&format!("DELETE FROM {table_ident} WHERE pk = {pk};\n"));
                }
            }
            if diff.modified_count > 0 {
                out.push_str(&format!(
                    "\n-- {} row(s) modified in {table_ident}\n",
                    diff.modified_count
                ));
                for pk in &diff.sample_modified_pks {
                    out.push_str(&format!("-- UPDATE {table_ident} ... WHERE pk = {pk};\n"));
                }
            }
        }
    }

    out
}
