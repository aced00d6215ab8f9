//! Wire formats for a finished row diff. Grounded on `differ::output`'s
//! `mod json; mod text; pub use ...; pub fn format_diff(...)` dispatch.

mod json;
mod text;

pub use json::format_json;
pub use text::format_text;

use crate::rowdiff::DiffOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format `{other}`, expected `text` or `json`")),
        }
    }
}

pub fn format_outcome(outcome: &DiffOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_text(&outcome.rows),
        OutputFormat::Json => format_json(outcome),
    }
}
