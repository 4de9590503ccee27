use crate::domain::models::report::ReportRow;
use anyhow::Error;

/// Destination of report rows. Implementations write the header when created.
pub trait ReportWriter {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), Error>;
}
