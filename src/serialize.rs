use quick_xml::escape::escape;

use crate::tree::{Document, NodeData, NodeId};

/// Renders the whole document as indented UTF-8 XML with a declaration.
///
/// Layout rules: an element without children self-closes, text-only content
/// stays on one line, element-only content gets one child per line at
/// two-space indents, and mixed content is emitted inline so no whitespace is
/// invented inside it.
pub fn serialize_document(doc: &Document) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    write_element(doc, doc.root(), 0, &mut out);
    out.push('\n');
    out
}

/// Renders a single node and its subtree without indentation. Used where a
/// fragment is embedded into another document verbatim.
pub fn serialize_node_compact(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_compact(doc, id, &mut out);
    out
}

fn write_element(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let Some(tag) = doc.tag(id) else {
        // A text node reached through element-only layout; render it padded.
        push_indent(depth, out);
        out.push_str(&escape(&doc.text_content(id)));
        return;
    };

    push_indent(depth, out);
    out.push('<');
    out.push_str(tag);
    write_attributes(doc, id, out);

    let children = doc.children(id);
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let has_element_child = children.iter().any(|child| doc.tag(*child).is_some());
    let has_text_child = children.iter().any(|child| doc.tag(*child).is_none());

    if !has_element_child {
        for child in children {
            out.push_str(&escape(&doc.text_content(*child)));
        }
    } else if has_text_child {
        for child in children {
            write_compact(doc, *child, out);
        }
    } else {
        out.push('\n');
        for child in children {
            write_element(doc, *child, depth + 1, out);
            out.push('\n');
        }
        push_indent(depth, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_compact(doc: &Document, id: NodeId, out: &mut String) {
    match &doc.node(id).data {
        NodeData::Text(text) => out.push_str(&escape(text)),
        NodeData::Element { tag, .. } => {
            out.push('<');
            out.push_str(tag);
            write_attributes(doc, id, out);

            let children = doc.children(id);
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_compact(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn write_attributes(doc: &Document, id: NodeId, out: &mut String) {
    for (name, value) in doc.attributes(id) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
