use crate::domain::model::{ConversionStats, ImportResponse, RowError};
use std::fmt::Write;

pub const MAX_ERRORS_SHOWN: usize = 5;

fn row_label(error: &RowError) -> String {
    match &error.row {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Human-readable summary of a successful import response.
pub fn render_import_summary(response: &ImportResponse) -> String {
    let mut out = String::new();
    let summary = &response.summary;

    let _ = writeln!(out, "📊 Import result:");
    let _ = writeln!(out, "  • Total rows: {}", summary.total);
    let _ = writeln!(out, "  • Succeeded: {}", summary.success);
    let _ = writeln!(out, "  • Failed: {}", summary.failed);
    let _ = writeln!(out, "  • New casts: {}", summary.new_casts);

    if !response.errors.is_empty() {
        let _ = writeln!(out, "\n⚠️  Errors ({}):", response.errors.len());
        for error in response.errors.iter().take(MAX_ERRORS_SHOWN) {
            let _ = writeln!(
                out,
                "  • Row {}: {}",
                row_label(error),
                error.error.as_deref().unwrap_or("")
            );
        }
        if response.errors.len() > MAX_ERRORS_SHOWN {
            let _ = writeln!(
                out,
                "  ... and {} more",
                response.errors.len() - MAX_ERRORS_SHOWN
            );
        }
    }

    if let Some(twitter) = response.twitter.as_ref().filter(|t| t.attempted > 0) {
        let _ = writeln!(out, "\n🐦 X (Twitter) posts:");
        let _ = writeln!(out, "  • Attempted: {}", twitter.attempted);
        let _ = writeln!(out, "  • Succeeded: {}", twitter.succeeded());
        let _ = writeln!(out, "  • Failed: {}", twitter.failed());
    }

    out
}

pub fn render_conversion_summary(stats: &ConversionStats, output_path: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "✅ Conversion finished!");
    let _ = writeln!(out, "  Converted: {} (publicly listed casts)", stats.converted);
    let _ = writeln!(out, "  Skipped: {} (hidden or incomplete rows)", stats.skipped);
    let _ = writeln!(out, "\nOutput file: {}", output_path);
    out
}
