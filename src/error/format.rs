use crate::error::{DsLockError, ErrorContext};
use colored::Colorize;

pub fn format_error_chain(error: &DsLockError) -> String {
    let context = ErrorContext::new(error);
    context.to_string()
}

/// Format error for a terminal; falls back to [`format_error_chain`] without color.
pub fn format_error_with_color(error: &DsLockError, use_color: bool) -> String {
    if !use_color {
        return format_error_chain(error);
    }

    let context = ErrorContext::new(error);
    let mut output = format!("{} {error}", "Error:".red().bold());

    if let Some(details) = &context.details {
        output.push_str(&format!("\n\n{details}"));
    }

    if let Some(suggestion) = &context.suggestion {
        output.push_str(&format!("\n\n{}", "Suggestion:".yellow().bold()));
        for line in suggestion.lines().filter(|line| !line.trim().is_empty()) {
            output.push_str(&format!("\n  {}", line.cyan()));
        }
    }

    output
}
