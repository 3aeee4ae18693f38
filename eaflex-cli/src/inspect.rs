//! Views for `eaflex inspect`
//!
//! Each view renders one document as text without converting it:
//!
//! - `tier-outline`: the tier hierarchy of an EAF document, one tier per line
//!   with its linguistic type, participant and annotation counts.
//! - `segments-json`: the segment records either direction would produce, as
//!   pretty JSON. For FlexText input the records are merged and paired, so the
//!   output shows what `convert --to eaf` will write.
//!
//! When no view is named, EAF input gets `tier-outline` and FlexText input
//! gets `segments-json`.

use eaflex_babel::formats::eaf::parse_eaf;
use eaflex_babel::transforms::{eaf_segments, flextext_segments, tier_outline};
use eaflex_babel::ConversionSettings;

/// All views accepted by `eaflex inspect`
pub const AVAILABLE_VIEWS: &[&str] = &["segments-json", "tier-outline"];

pub fn default_view(format: &str) -> &'static str {
    match format {
        "eaf" => "tier-outline",
        _ => "segments-json",
    }
}

/// Render `source`, read as `format`, through the named view.
pub fn execute_view(
    source: &str,
    format: &str,
    view: &str,
    settings: &ConversionSettings,
) -> Result<String, String> {
    match (view, format) {
        ("tier-outline", "eaf") => {
            let doc = parse_eaf(source).map_err(|e| format!("Parse error: {e}"))?;
            Ok(tier_outline(&doc))
        }
        ("tier-outline", other) => Err(format!(
            "tier-outline needs an eaf document, got {other}"
        )),
        ("segments-json", "eaf") => {
            let records = eaf_segments(source, settings).map_err(|e| e.to_string())?;
            to_json(&records)
        }
        ("segments-json", "flextext") => {
            let records = flextext_segments(source, settings).map_err(|e| e.to_string())?;
            to_json(&records)
        }
        (view, format) => Err(format!("Unknown view '{view}' for {format} input")),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .map_err(|e| format!("JSON serialization failed: {e}"))
}
