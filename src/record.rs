//! Name-keyed lookups over `<object>` records.
//!
//! Fields are `<property name="...">` children at any depth; names are
//! matched ASCII case-insensitively for every special-purpose lookup, with
//! the single exception of title promotion (see `title`), which wants the
//! literal `"title"`.

use std::collections::HashMap;

use crate::tree::{Document, NodeId};

/// Direct children of the root tagged `object`, optionally narrowed to those
/// whose `class` attribute equals `class_filter`. Excluded objects behave
/// like any other non-record sibling.
pub fn select_records(doc: &Document, class_filter: Option<&str>) -> Vec<NodeId> {
    doc.children(doc.root())
        .iter()
        .copied()
        .filter(|id| doc.tag(*id) == Some("object"))
        .filter(|id| match class_filter {
            Some(class) => doc.attribute_ci(*id, "class") == Some(class),
            None => true,
        })
        .collect()
}

/// Every `<property>` beneath the record, in document order.
pub fn properties(doc: &Document, record: NodeId) -> Vec<NodeId> {
    descendants_tagged(doc, record, "property")
}

pub fn property_name<'a>(doc: &'a Document, property: NodeId) -> Option<&'a str> {
    doc.attribute(property, "name")
}

/// First property whose name equals `name`, ASCII case-insensitively.
pub fn property_named_ci(doc: &Document, record: NodeId, name: &str) -> Option<NodeId> {
    properties(doc, record).into_iter().find(|id| {
        property_name(doc, *id).is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
    })
}

/// Trimmed text of the `<id name="id">` element beneath the record.
pub fn identifier_text(doc: &Document, record: NodeId) -> Option<String> {
    descendants_tagged(doc, record, "id")
        .into_iter()
        .find(|id| {
            doc.attribute(*id, "name")
                .is_some_and(|name| name.eq_ignore_ascii_case("id"))
        })
        .map(|id| doc.text_content(id).trim().to_string())
}

pub fn links(doc: &Document, record: NodeId) -> Vec<NodeId> {
    descendants_tagged(doc, record, "link")
}

pub fn collections(doc: &Document, record: NodeId) -> Vec<NodeId> {
    descendants_tagged(doc, record, "collection")
}

/// Read-only identifier-to-record index, built once after redaction and
/// promotion. The first record wins on duplicate identifiers.
pub fn build_identifier_index(doc: &Document, records: &[NodeId]) -> HashMap<String, NodeId> {
    let mut index = HashMap::new();
    for &record in records {
        if let Some(id) = identifier_text(doc, record) {
            if !id.is_empty() {
                index.entry(id).or_insert(record);
            }
        }
    }
    index
}

fn descendants_tagged(doc: &Document, id: NodeId, tag: &str) -> Vec<NodeId> {
    doc.descendants(id)
        .into_iter()
        .filter(|candidate| doc.tag(*candidate) == Some(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    const SAMPLE: &str = r#"<root>
        <meta>untouched</meta>
        <object class="page">
            <id name="id">5</id>
            <wrapper><property name="Title">Nested</property></wrapper>
        </object>
        <object class="asset"><id name="id">9</id></object>
    </root>"#;

    #[test]
    fn select_records_skips_non_object_siblings() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(select_records(&doc, None).len(), 2);
    }

    #[test]
    fn class_filter_narrows_the_selection() {
        let doc = parse_document(SAMPLE).unwrap();
        let records = select_records(&doc, Some("page"));
        assert_eq!(records.len(), 1);
        assert_eq!(identifier_text(&doc, records[0]).as_deref(), Some("5"));
    }

    #[test]
    fn property_lookup_is_case_insensitive_and_depth_blind() {
        let doc = parse_document(SAMPLE).unwrap();
        let record = select_records(&doc, None)[0];
        let property = property_named_ci(&doc, record, "title").unwrap();
        assert_eq!(doc.text_content(property), "Nested");
        assert!(property_named_ci(&doc, record, "missing").is_none());
    }

    #[test]
    fn identifier_index_maps_id_text_to_records() {
        let doc = parse_document(SAMPLE).unwrap();
        let records = select_records(&doc, None);
        let index = build_identifier_index(&doc, &records);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("9"), Some(&records[1]));
    }

    #[test]
    fn missing_identifier_yields_none() {
        let doc = parse_document("<root><object><property name=\"x\">1</property></object></root>")
            .unwrap();
        let record = select_records(&doc, None)[0];
        assert!(identifier_text(&doc, record).is_none());
    }
}
