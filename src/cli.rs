use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "xmlsort",
    version,
    about = "Sort <object> records in an XML export, strip sensitive fields, promote titles, and emit cleaned XML plus an HTML report"
)]
pub struct Cli {
    /// Path to the input XML file.
    pub input_file: PathBuf,

    /// Path where the sorted XML is written.
    pub output_file: PathBuf,

    #[arg(short = 'k', long = "key", value_enum, default_value_t = SortMode::Id)]
    pub key: SortMode,

    /// Only sort objects whose `class` attribute equals this value; other
    /// objects stay in place untouched.
    #[arg(long)]
    pub class: Option<String>,

    /// Where to write the HTML report. Defaults to the XML output path with
    /// an `.html` extension.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Optional path for a JSON run summary (counts and output locations).
    #[arg(long)]
    pub summary_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortMode {
    /// Numeric sort on the record identifier.
    Id,
    /// Alphabetical sort on the promoted title, case-folded.
    Title,
    /// Chronological sort on the record timestamp.
    Datetime,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Datetime => "datetime",
        }
    }
}
