use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::model::RunSummary;
use crate::parse::load_document;
use crate::record;
use crate::redact::Redactor;
use crate::report::ReportRenderer;
use crate::serialize::serialize_document;
use crate::sort;
use crate::title::promote_title;
use crate::util::{now_utc_string, write_json_pretty};

/// Runs the whole pipeline for one invocation: load, redact and promote per
/// record, sort, reassemble, then write the XML document and (only after that
/// succeeded) the HTML report.
pub fn run(args: Cli) -> Result<()> {
    let redactor = Redactor::new()?;
    let renderer = ReportRenderer::new()?;

    let mut doc = load_document(&args.input_file)?;
    info!(path = %args.input_file.display(), "parsed input document");

    let mut records = record::select_records(&doc, args.class.as_deref());
    if records.is_empty() {
        warn!(
            class = args.class.as_deref().unwrap_or("<any>"),
            "no matching <object> records found"
        );
    }

    let mut redacted_fields = 0usize;
    let mut redacted_attributes = 0usize;
    let mut promoted_titles = 0usize;
    for &record_id in &records {
        let counts = redactor.redact_record(&mut doc, record_id);
        redacted_fields += counts.fields;
        redacted_attributes += counts.attributes;
        if promote_title(&mut doc, record_id) {
            promoted_titles += 1;
        }
    }
    info!(
        record_count = records.len(),
        redacted_fields,
        redacted_attributes,
        promoted_titles,
        "cleaned records"
    );

    let index = record::build_identifier_index(&doc, &records);

    sort::sort_records(&doc, &mut records, args.key);
    sort::reassemble(&mut doc, &records);
    info!(sort_key = args.key.as_str(), "sorted records");

    let xml = serialize_document(&doc);
    fs::write(&args.output_file, xml)
        .with_context(|| format!("failed to write sorted XML to {}", args.output_file.display()))?;
    info!(path = %args.output_file.display(), "wrote sorted XML");

    let report_path = report_path(&args);
    let html = renderer.render(&doc, &records, &index);
    fs::write(&report_path, html)
        .with_context(|| format!("failed to write HTML report to {}", report_path.display()))?;
    info!(path = %report_path.display(), "wrote HTML report");

    if let Some(summary_path) = &args.summary_path {
        let summary = RunSummary {
            generated_at: now_utc_string(),
            input_path: args.input_file.display().to_string(),
            xml_output_path: args.output_file.display().to_string(),
            html_output_path: report_path.display().to_string(),
            sort_key: args.key.as_str().to_string(),
            record_class: args.class.clone(),
            record_count: records.len(),
            redacted_field_count: redacted_fields,
            redacted_attribute_count: redacted_attributes,
            promoted_title_count: promoted_titles,
        };
        write_json_pretty(summary_path, &summary)?;
        info!(path = %summary_path.display(), "wrote run summary");
    }

    Ok(())
}

fn report_path(args: &Cli) -> PathBuf {
    args.report_path
        .clone()
        .unwrap_or_else(|| args.output_file.with_extension("html"))
}
