use serde::Serialize;

/// Machine-readable account of one run, written when `--summary-path` is
/// given.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub input_path: String,
    pub xml_output_path: String,
    pub html_output_path: String,
    pub sort_key: String,
    pub record_class: Option<String>,
    pub record_count: usize,
    pub redacted_field_count: usize,
    pub redacted_attribute_count: usize,
    pub promoted_title_count: usize,
}
