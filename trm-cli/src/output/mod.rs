//! Output formatting for CLI.

mod json;
mod text;

pub use json::{
    CreditsOutput, JsonFormatter, PathsOutput, QuoteOutput, RulesOutput, SummaryOutput,
    ValidationOutput,
};
pub use text::{SummaryView, TextFormatter};
