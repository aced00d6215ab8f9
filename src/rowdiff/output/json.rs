//! JSON-lines row diff output: one `[sign, row]` array per line, followed by
//! a trailing stats object when the algorithm produced one (`JoinDiff` only).

use crate::rowdiff::DiffOutcome;
use serde_json::json;

pub fn format_json(outcome: &DiffOutcome) -> String {
    let mut lines: Vec<String> = outcome
        .rows
        .iter()
        .map(|(sign, row)| json!([sign.as_char().to_string(), row]).to_string())
        .collect();

    if let Some(stats) = &outcome.join_stats {
        let values: serde_json::Map<String, serde_json::Value> = stats
            .column_diff_counts
            .iter()
            .map(|(col, count)| (col.clone(), json!(count)))
            .collect();
        lines.push(
            json!({
                "rows_A": stats.rows_a,
                "rows_B": stats.rows_b,
                "exclusive_A": stats.exclusive_a,
                "exclusive_B": stats.exclusive_b,
                "updated": stats.updated,
                "unchanged": stats.unchanged,
                "values": values,
            })
            .to_string(),
        );
    }

    lines.join("\n")
}
