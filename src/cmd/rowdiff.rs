use crate::rowdiff::output::{format_outcome, OutputFormat};
use crate::rowdiff::{connect_to_table, diff_tables, Algorithm, DiffConfig};
use std::sync::Arc;

#[allow(clippy::too_many_arguments)]
pub fn run(
    a_uri: String,
    b_uri: String,
    table: String,
    key_column: Option<String>,
    update_column: Option<String>,
    extra_column: Vec<String>,
    algorithm: Option<String>,
    bisection_factor: usize,
    bisection_threshold: usize,
    threads: usize,
    format: Option<String>,
    materialize_to_table: Option<String>,
    skip_null_keys: bool,
    stats: bool,
) -> anyhow::Result<()> {
    let output_format: OutputFormat = format
        .as_deref()
        .map(|f| f.parse().map_err(|e: String| anyhow::anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let algorithm = match algorithm.as_deref() {
        None | Some("auto") => Algorithm::Auto,
        Some("hashdiff") => Algorithm::HashDiff,
        Some("joindiff") => Algorithm::JoinDiff,
        Some(other) => anyhow::bail!("unknown algorithm `{other}`, expected auto, hashdiff, or joindiff"),
    };

    let key_columns: Vec<String> = key_column
        .map(|s| s.split(',').map(|c| c.trim().to_string()).collect())
        .unwrap_or_else(|| vec!["id".to_string()]);

    let table_path: Vec<String> = table.split('.').map(|s| s.to_string()).collect();

    let db_a: Arc<dyn crate::database::Database> = Arc::from(crate::database::connect(&a_uri)?);
    let db_b: Arc<dyn crate::database::Database> = Arc::from(crate::database::connect(&b_uri)?);

    let a = connect_to_table(db_a, table_path.clone(), key_columns.clone())?;
    let b = connect_to_table(db_b, table_path, key_columns)?;

    let config = DiffConfig {
        update_column,
        extra_columns: extra_column,
        algorithm,
        bisection_factor,
        bisection_threshold,
        threaded: threads > 1,
        max_threadpool_size: threads.max(1),
        skip_null_keys,
        materialize_to_table: materialize_to_table
            .map(|t| t.split('.').map(|s| s.to_string()).collect()),
    };

    let outcome = diff_tables(a, b, &config)?;

    for warning in &outcome.warnings {
        match &warning.table {
            Some(table) => eprintln!("warning: {table}: {}", warning.message),
            None => eprintln!("warning: {}", warning.message),
        }
    }

    print!("{}", format_outcome(&outcome, output_format));

    if stats {
        if let Some(stats) = &outcome.join_stats {
            eprintln!(
                "rows_A={} rows_B={} exclusive_A={} exclusive_B={} updated={} unchanged={}",
                stats.rows_a, stats.rows_b, stats.exclusive_a, stats.exclusive_b, stats.updated, stats.unchanged
            );
        } else {
            eprintln!("stats are only collected by the joindiff algorithm");
        }
    }

    Ok(())
}
