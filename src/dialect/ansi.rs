//! Default SQL fragments shared by dialects that don't override them.

/// NULL-safe concat: engines that propagate NULL through `||`/`concat` would
/// silently drop a whole row's checksum contribution, so every part is
/// coalesced to a sentinel first (the caller already wraps each part with
/// `coalesce(.., '<null>')` at the `Checksum` AST node; this just joins them).
pub fn concat_with_concat_fn(parts: &[String]) -> String {
    format!("CONCAT({})", parts.join(", "))
}

pub fn is_distinct_from_fallback(a: &str, b: &str) -> String {
    format!("(({a} <> {b} OR {a} IS NULL OR {b} IS NULL) AND NOT ({a} IS NULL AND {b} IS NULL))")
}

pub fn offset_limit(offset: Option<u64>, limit: Option<u64>) -> String {
    let mut out = String::new();
    if let Some(limit) = limit {
        out.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = offset {
        out.push_str(&format!(" OFFSET {offset}"));
    }
    out
}

/// `CAST(expr AS DECIMAL(38, precision))` then stringify, which yields a
/// fixed number of fractional digits on every ANSI-ish engine.
pub fn normalize_number_via_cast(expr: &str, precision: u32) -> String {
    if precision == 0 {
        format!("CAST(CAST({expr} AS DECIMAL(38, 0)) AS VARCHAR)")
    } else {
        format!("CAST(CAST({expr} AS DECIMAL(38, {precision})) AS VARCHAR)")
    }
}
