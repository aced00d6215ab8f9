//! Human-readable row diff output, one line per tuple, color-coded by sign.

use crate::rowdiff::{DiffRow, Sign};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

pub fn format_text(rows: &[DiffRow]) -> String {
    let mut output = String::new();
    for row in rows {
        let color = match row.0 {
            Sign::Minus => RED,
            Sign::Plus => GREEN,
        };
        output.push_str(&format!("{color}{} {}{RESET}\n", row.0.as_char(), row.1.join(", ")));
    }
    if rows.is_empty() {
        output.push_str("(no differences)\n");
    }
    output
}
