use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::cli::SortMode;
use crate::record;
use crate::tree::{Document, NodeId};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reorders `records` in place with a stable sort on the key for `mode`.
/// Every record yields a key through a documented fallback, so sorting never
/// fails; ties keep their original relative order.
pub fn sort_records(doc: &Document, records: &mut [NodeId], mode: SortMode) {
    match mode {
        SortMode::Id => records.sort_by_key(|id| identifier_key(doc, *id)),
        SortMode::Title => records.sort_by_key(|id| title_key(doc, *id)),
        SortMode::Datetime => records.sort_by_key(|id| datetime_key(doc, *id)),
    }
}

/// Numeric identifier; missing or unparseable identifiers count as 0.
pub fn identifier_key(doc: &Document, record: NodeId) -> i64 {
    record::identifier_text(doc, record)
        .and_then(|text| text.parse().ok())
        .unwrap_or(0)
}

/// Lowercased text of the promoted `<title>`; missing titles sort first as
/// the empty string.
pub fn title_key(doc: &Document, record: NodeId) -> String {
    doc.children(record)
        .iter()
        .copied()
        .find(|child| doc.tag(*child) == Some("title"))
        .map(|title| doc.text_content(title).to_lowercase())
        .unwrap_or_default()
}

/// Timestamp from the record's `datetime` attribute, falling back to a
/// `creationDate` property (first 19 characters, tolerating trailing
/// fractional or timezone text). Anything unparseable groups at
/// `NaiveDateTime::MIN`, before every valid date.
pub fn datetime_key(doc: &Document, record: NodeId) -> NaiveDateTime {
    let from_attribute = doc
        .attribute_ci(record, "datetime")
        .and_then(|value| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok());
    if let Some(parsed) = from_attribute {
        return parsed;
    }

    record::property_named_ci(doc, record, "creationDate")
        .and_then(|property| {
            let text = doc.text_content(property);
            let trimmed = text.trim();
            let prefix = trimmed.get(..19).unwrap_or(trimmed);
            NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).ok()
        })
        .unwrap_or(NaiveDateTime::MIN)
}

/// Detaches the sorted records from their positions in the root's child
/// sequence and appends them at the end in sorted order. Non-record siblings
/// keep their relative order.
pub fn reassemble(doc: &mut Document, sorted: &[NodeId]) {
    let root = doc.root();
    let selected: HashSet<NodeId> = sorted.iter().copied().collect();
    doc.node_mut(root)
        .children
        .retain(|child| !selected.contains(child));
    for &record in sorted {
        doc.append_child(root, record);
    }
}
