use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::record;
use crate::tree::{Document, NodeId};

/// Four dot-separated 1-3 digit groups. Deliberately loose: groups are not
/// range-checked against 0-255, so `999.999.999.999` is treated as an
/// address-shaped value and removed.
const IPV4_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionCounts {
    pub fields: usize,
    pub attributes: usize,
}

pub struct Redactor {
    ipv4: Regex,
}

impl Redactor {
    pub fn new() -> Result<Self> {
        let ipv4 = Regex::new(IPV4_PATTERN).context("failed to compile IPv4 pattern")?;
        Ok(Self { ipv4 })
    }

    /// Removes every property beneath the record whose name contains
    /// `password` (case-insensitive) or whose subtree text looks like an IPv4
    /// address, then drops matching attributes from the record element
    /// itself. A property that is already unlinked is skipped silently.
    pub fn redact_record(&self, doc: &mut Document, record: NodeId) -> RedactionCounts {
        let mut counts = RedactionCounts::default();

        for property in record::properties(doc, record) {
            let name = record::property_name(doc, property)
                .unwrap_or_default()
                .to_string();
            let sensitive = name.to_ascii_lowercase().contains("password")
                || self.ipv4.is_match(&doc.text_content(property));
            if sensitive && doc.detach(property) {
                debug!(field = name, "redacted sensitive property");
                counts.fields += 1;
            }
        }

        let before = doc.attributes(record).len();
        let ipv4 = &self.ipv4;
        doc.retain_attributes(record, |name, value| {
            !(name.to_ascii_lowercase().contains("password") || ipv4.is_match(value))
        });
        counts.attributes = before - doc.attributes(record).len();

        counts
    }
}
