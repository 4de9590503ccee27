use crate::domain::models::report::{REPORT_HEADER, ReportRow};
use crate::domain::report::ReportWriter;
use anyhow::{Context, Error};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes report rows as CSV, flushing after every row so an aborted batch keeps what it produced.
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportWriter<File> {
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        Self::new(file)
    }
}

impl<W: Write> CsvReportWriter<W> {
    pub fn new(inner: W) -> Result<Self, Error> {
        // The header is written by hand: serde headers only appear with the first row.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(inner);
        writer
            .write_record(REPORT_HEADER)
            .context("Failed to write report header")?;
        writer.flush().context("Failed to flush report header")?;

        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::new(e.into_error()))
            .context("Failed to flush report")
    }
}

impl<W: Write> ReportWriter for CsvReportWriter<W> {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), Error> {
        self.writer
            .serialize(row)
            .with_context(|| format!("Failed to write report row for {}", row.repo))?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush report row for {}", row.repo))?;
        Ok(())
    }
}
