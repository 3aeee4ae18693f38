//! Lookups between time-slot ids and time values.
//!
//! Reading an annotation document resolves slot ids to values. Writing one
//! goes the other way: a [`TimeOrder`] is built from the phrase offsets first,
//! then every phrase boundary is looked up by value.

use crate::error::ConversionError;
use crate::ir::eaf::TimeOrder;
use crate::ir::flextext::InterlinearDocument;
use crate::ir::segment::TimePoint;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    by_slot: HashMap<String, Option<f64>>,
    by_value: Vec<(f64, String)>,
}

impl TimeIndex {
    pub fn build(order: &TimeOrder) -> Self {
        let mut index = TimeIndex::default();
        for slot in &order.slots {
            index.by_slot.insert(slot.id.clone(), slot.value);
            if let Some(value) = slot.value {
                index.by_value.push((value, slot.id.clone()));
            }
        }
        index
    }

    pub fn value(&self, slot: &str) -> Result<f64, ConversionError> {
        match self.by_slot.get(slot) {
            Some(Some(value)) => Ok(*value),
            Some(None) => Err(ConversionError::Alignment(format!(
                "time slot '{slot}' has no time value"
            ))),
            None => Err(ConversionError::Alignment(format!(
                "time slot '{slot}' is not defined"
            ))),
        }
    }

    /// First slot carrying exactly this value.
    pub fn slot_for_value(&self, value: f64) -> Result<&str, ConversionError> {
        self.by_value
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, id)| id.as_str())
            .ok_or_else(|| ConversionError::Alignment(format!("no time slot has value {value}")))
    }

    pub fn point_for_slot(&self, slot: &str) -> Result<TimePoint, ConversionError> {
        Ok(TimePoint {
            slot: Some(slot.to_string()),
            value: self.value(slot)?,
        })
    }

    pub fn point_for_value(&self, value: f64) -> Result<TimePoint, ConversionError> {
        Ok(TimePoint {
            slot: Some(self.slot_for_value(value)?.to_string()),
            value,
        })
    }
}

/// Parse a phrase offset.
pub fn parse_offset(raw: &str) -> Result<f64, ConversionError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| ConversionError::Alignment(format!("malformed time offset '{raw}'")))
}

/// Render a time value the way it is written in both formats (`1500`, `12.5`).
pub fn format_offset(value: f64) -> String {
    value.to_string()
}

/// Build the timeline for a new annotation document from phrase offsets.
///
/// Each distinct `(begin, end)` pair gets two fresh slots, in document order.
/// Phrases without any offset contribute nothing; a phrase with only one
/// offset, or a malformed one, is an alignment error.
pub fn time_order_from_phrases(doc: &InterlinearDocument) -> Result<TimeOrder, ConversionError> {
    let mut order = TimeOrder::default();
    let mut seen: Vec<(f64, f64)> = Vec::new();

    for phrase in doc.phrases() {
        let (begin, end) = match (&phrase.begin_offset, &phrase.end_offset) {
            (None, None) => continue,
            (Some(begin), Some(end)) => (parse_offset(begin)?, parse_offset(end)?),
            _ => {
                return Err(ConversionError::Alignment(format!(
                    "phrase {} has only one of its two time offsets",
                    phrase.segnum.as_deref().unwrap_or("?")
                )))
            }
        };
        if seen.contains(&(begin, end)) {
            continue;
        }
        seen.push((begin, end));
        order.push(begin);
        order.push(end);
    }
    Ok(order)
}
