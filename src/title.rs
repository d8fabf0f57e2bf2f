use tracing::debug;

use crate::record;
use crate::tree::{Document, NodeId};

/// Hoists the first `<property name="title">` beneath the record into a
/// `<title>` element placed as the record's first child, moving the
/// property's text and sub-tree content rather than copying it.
///
/// The match is deliberately case-sensitive on the literal `"title"`, unlike
/// the case-insensitive lookups used elsewhere. When no such property exists
/// the record is left untouched; the report renderer supplies its own
/// fallback at render time.
pub fn promote_title(doc: &mut Document, record: NodeId) -> bool {
    let Some(property) = record::properties(doc, record)
        .into_iter()
        .find(|id| record::property_name(doc, *id) == Some("title"))
    else {
        return false;
    };

    let title = doc.new_element("title", Vec::new());
    doc.move_children(property, title);
    doc.detach(property);
    doc.insert_first(record, title);
    debug!("promoted title property");
    true
}
