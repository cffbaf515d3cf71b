//! CSV export of the records accepted during a run
//!
//! Every field is wrapped in double quotes. Quotes inside field values are
//! written as-is, so a value containing `"` produces a row that strict CSV
//! readers will split incorrectly.

use crate::output::report::{OutputError, OutputResult};
use crate::storage::JobRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of the export file
pub const CSV_HEADER: &str = "URL,工作名称,薪水,工作地址,工作经验,学历要求,公司名称,工作内容";

/// Accepted records of one run, in the order they were saved
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    records: Vec<JobRecord>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: JobRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Renders the header and one line per record
    pub fn render_csv(&self) -> String {
        let mut out = String::with_capacity(CSV_HEADER.len() + 1 + self.records.len() * 256);
        out.push_str(CSV_HEADER);
        out.push('\n');
        for record in &self.records {
            out.push_str(&format_row(record));
            out.push('\n');
        }
        out
    }

    /// Writes the export to `path`, replacing any existing file
    ///
    /// Returns the number of data rows written.
    pub fn write_csv(&self, path: &Path) -> OutputResult<usize> {
        let write = || -> std::io::Result<()> {
            let mut writer = BufWriter::new(File::create(path)?);
            writer.write_all(self.render_csv().as_bytes())?;
            writer.flush()
        };

        write().map_err(|source| OutputError::Write {
            path: path.display().to_string(),
            source,
        })?;

        Ok(self.records.len())
    }
}

fn format_row(record: &JobRecord) -> String {
    let fields = [
        Some(record.url.as_str()),
        record.work_name.as_deref(),
        record.salary.as_deref(),
        record.address.as_deref(),
        record.years_experience.as_deref(),
        record.degree.as_deref(),
        record.company_name.as_deref(),
        record.content.as_deref(),
    ];

    fields
        .iter()
        .map(|field| format!("\"{}\"", field.unwrap_or("")))
        .collect::<Vec<_>>()
        .join(",")
}
