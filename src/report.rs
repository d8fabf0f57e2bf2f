use std::collections::HashMap;

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use regex::Regex;

use crate::record;
use crate::serialize::serialize_node_compact;
use crate::tree::{Document, NodeId};

const URL_PATTERN: &str = r"https?://\S+";

const NO_TITLE: &str = "(no title)";
const NO_ID: &str = "(no id)";
const NO_DATETIME: &str = "(no datetime)";
const NO_NAME: &str = "(no name)";

/// Builds the self-contained HTML report: one section per record in sort
/// order, URL-shaped values rendered as anchors, everything else escaped.
pub struct ReportRenderer {
    url: Regex,
}

impl ReportRenderer {
    pub fn new() -> Result<Self> {
        let url = Regex::new(URL_PATTERN).context("failed to compile URL pattern")?;
        Ok(Self { url })
    }

    pub fn render(
        &self,
        doc: &Document,
        records: &[NodeId],
        index: &HashMap<String, NodeId>,
    ) -> String {
        let mut lines = vec![
            "<!DOCTYPE html>".to_string(),
            "<html><head><meta charset='utf-8'><title>Objects Report</title>".to_string(),
            "<style>".to_string(),
            " body{font-family:sans-serif;padding:1em;}".to_string(),
            " section{border:1px solid #ccc; padding:1em; margin:1em 0;}".to_string(),
            " h2{margin:0 0.5em 0.3em;} a{color:blue;}".to_string(),
            " pre{background:#f6f6f6; padding:0.5em; overflow-x:auto;}".to_string(),
            "</style></head><body>".to_string(),
            format!("<h1>Objects ({})</h1>", records.len()),
        ];

        for &record in records {
            self.render_section(doc, record, index, &mut lines);
        }

        lines.push("</body></html>".to_string());
        lines.join("\n")
    }

    fn render_section(
        &self,
        doc: &Document,
        record: NodeId,
        index: &HashMap<String, NodeId>,
        lines: &mut Vec<String>,
    ) {
        lines.push("<section>".to_string());
        lines.push(format!("<h2>{}</h2>", escape(&display_title(doc, record))));
        lines.push(format!(
            "<p><strong>ID:</strong> {}</p>",
            escape(&record::identifier_text(doc, record).unwrap_or_else(|| NO_ID.to_string()))
        ));
        lines.push(format!(
            "<p><strong>Datetime:</strong> {}</p>",
            escape(&display_datetime(doc, record))
        ));

        for link in record::links(doc, record) {
            let text = doc.text_content(link);
            let url = text.trim();
            if self.is_url(url) {
                lines.push(format!("<p><strong>Link:</strong> {}</p>", anchor(url)));
            }
        }

        for property in record::properties(doc, record) {
            let name = record::property_name(doc, property).unwrap_or(NO_NAME);
            let lower = name.to_ascii_lowercase();
            // Already rendered above the field list.
            if matches!(lower.as_str(), "title" | "lowertitle" | "creationdate") {
                continue;
            }

            let text = doc.text_content(property);
            let value = text.trim();

            if lower == "body" && self.render_body(doc, value, index, lines) {
                continue;
            }

            if matches!(lower.as_str(), "link" | "url") && self.is_url(value) {
                lines.push(format!(
                    "<p><strong>{}:</strong> {}</p>",
                    escape(name),
                    anchor(value)
                ));
            } else {
                lines.push(format!(
                    "<p><strong>{}:</strong> {}</p>",
                    escape(name),
                    self.linkify(value)
                ));
            }
        }

        for collection in record::collections(doc, record) {
            render_collection(doc, collection, lines);
        }

        lines.push("</section>".to_string());
    }

    /// Renders a body property that references another record by identifier:
    /// a raw escaped dump of the referenced record plus its content as
    /// trusted markup. Returns false when the reference does not resolve, so
    /// the caller falls back to plain field rendering.
    fn render_body(
        &self,
        doc: &Document,
        reference: &str,
        index: &HashMap<String, NodeId>,
        lines: &mut Vec<String>,
    ) -> bool {
        let Some(&target) = index.get(reference) else {
            return false;
        };

        lines.push(format!("<h3>Body ({})</h3>", escape(reference)));
        lines.push(format!(
            "<pre>{}</pre>",
            escape(&serialize_node_compact(doc, target))
        ));

        let mut rendered = String::new();
        for &child in doc.children(target) {
            rendered.push_str(&serialize_node_compact(doc, child));
        }
        lines.push(format!("<div class=\"body\">{rendered}</div>"));
        true
    }

    /// Splits `text` on URL matches, escaping the literal segments and
    /// splicing in an anchor per match, preserving the surrounding text.
    fn linkify(&self, text: &str) -> String {
        let mut out = String::new();
        let mut last = 0;
        for found in self.url.find_iter(text) {
            out.push_str(&escape(&text[last..found.start()]));
            out.push_str(&anchor(found.as_str()));
            last = found.end();
        }
        out.push_str(&escape(&text[last..]));
        out
    }

    fn is_url(&self, text: &str) -> bool {
        self.url.find(text).is_some_and(|found| found.start() == 0)
    }
}

fn display_title(doc: &Document, record: NodeId) -> String {
    let promoted = doc
        .children(record)
        .iter()
        .copied()
        .find(|child| doc.tag(*child) == Some("title"))
        .map(|title| doc.text_content(title));
    if let Some(title) = promoted {
        return title;
    }

    record::property_named_ci(doc, record, "lowerTitle")
        .map(|property| doc.text_content(property).trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

fn display_datetime(doc: &Document, record: NodeId) -> String {
    if let Some(value) = doc.attribute_ci(record, "datetime") {
        return value.to_string();
    }
    record::property_named_ci(doc, record, "creationDate")
        .map(|property| doc.text_content(property).trim().to_string())
        .unwrap_or_else(|| NO_DATETIME.to_string())
}

fn render_collection(doc: &Document, collection: NodeId, lines: &mut Vec<String>) {
    let label = doc.attribute(collection, "name").unwrap_or(NO_NAME);
    lines.push(format!("<h3>{}</h3>", escape(label)));
    lines.push("<ul>".to_string());

    for &entry in doc.children(collection) {
        if doc.tag(entry) != Some("element") {
            continue;
        }
        let has_markup = doc.children(entry).iter().any(|c| doc.tag(*c).is_some());
        if has_markup {
            // The entry carries its own markup; emit it verbatim.
            let mut inner = String::new();
            for &child in doc.children(entry) {
                inner.push_str(&serialize_node_compact(doc, child));
            }
            lines.push(format!("<li>{inner}</li>"));
        } else {
            lines.push(format!(
                "<li>{}</li>",
                escape(doc.text_content(entry).trim())
            ));
        }
    }

    lines.push("</ul>".to_string());
}

fn anchor(url: &str) -> String {
    let escaped = escape(url);
    format!("<a href=\"{escaped}\" target=\"_blank\">{escaped}</a>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use crate::record::{build_identifier_index, select_records};

    fn render(raw: &str) -> String {
        let doc = parse_document(raw).unwrap();
        let records = select_records(&doc, None);
        let index = build_identifier_index(&doc, &records);
        ReportRenderer::new().unwrap().render(&doc, &records, &index)
    }

    #[test]
    fn linkify_splices_anchors_between_escaped_segments() {
        let renderer = ReportRenderer::new().unwrap();
        let rendered =
            renderer.linkify("see http://a.example/x and http://b.example/y for info");
        assert_eq!(
            rendered,
            "see <a href=\"http://a.example/x\" target=\"_blank\">http://a.example/x</a> \
             and <a href=\"http://b.example/y\" target=\"_blank\">http://b.example/y</a> for info"
        );
    }

    #[test]
    fn url_valued_properties_become_anchors() {
        let html = render(
            r#"<root><object>
                <property name="url">https://example.com/page</property>
            </object></root>"#,
        );
        assert!(html.contains(
            "<p><strong>url:</strong> <a href=\"https://example.com/page\" target=\"_blank\">"
        ));
    }

    #[test]
    fn link_children_render_only_when_url_shaped() {
        let html = render(
            r#"<root><object>
                <link>https://example.com/a</link>
                <link>not a url</link>
            </object></root>"#,
        );
        assert!(html.contains("<p><strong>Link:</strong> <a href=\"https://example.com/a\""));
        assert!(!html.contains("not a url"));
    }

    #[test]
    fn plain_values_are_escaped_against_markup_injection() {
        let html = render(
            r#"<root><object>
                <property name="note">&lt;script&gt;alert(1)&lt;/script&gt;</property>
            </object></root>"#,
        );
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn display_title_falls_back_to_lower_title_then_placeholder() {
        let html = render(
            r#"<root>
                <object><property name="lowerTitle">fallback one</property></object>
                <object><property name="other">x</property></object>
            </root>"#,
        );
        assert!(html.contains("<h2>fallback one</h2>"));
        assert!(html.contains("<h2>(no title)</h2>"));
    }

    #[test]
    fn collections_render_labeled_lists_with_trusted_or_escaped_entries() {
        let html = render(
            r#"<root><object>
                <collection name="tags">
                    <element>plain &amp; simple</element>
                    <element><b>styled</b></element>
                </collection>
            </object></root>"#,
        );
        assert!(html.contains("<h3>tags</h3>"));
        assert!(html.contains("<li>plain &amp; simple</li>"));
        assert!(html.contains("<li><b>styled</b></li>"));
    }

    #[test]
    fn body_reference_resolves_through_the_identifier_index() {
        let html = render(
            r#"<root>
                <object><id name="id">1</id><property name="body">2</property></object>
                <object><id name="id">2</id><content>payload</content></object>
            </root>"#,
        );
        assert!(html.contains("<h3>Body (2)</h3>"));
        assert!(html.contains("&lt;content&gt;payload&lt;/content&gt;"));
        assert!(html.contains("<div class=\"body\">"));
    }

    #[test]
    fn unresolved_body_renders_as_a_plain_field() {
        let html = render(
            r#"<root><object>
                <id name="id">1</id>
                <property name="body">no such id</property>
            </object></root>"#,
        );
        assert!(html.contains("<p><strong>body:</strong> no such id</p>"));
        assert!(!html.contains("<h3>Body"));
    }

    #[test]
    fn datetime_attribute_and_creation_date_fallback_are_rendered() {
        let html = render(
            r#"<root>
                <object datetime="2024-05-01 10:00:00"><id name="id">1</id></object>
                <object><property name="creationDate">2023-01-01 00:00:00</property></object>
            </root>"#,
        );
        assert!(html.contains("<p><strong>Datetime:</strong> 2024-05-01 10:00:00</p>"));
        assert!(html.contains("<p><strong>Datetime:</strong> 2023-01-01 00:00:00</p>"));
    }
}
