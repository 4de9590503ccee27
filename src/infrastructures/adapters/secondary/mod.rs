pub mod external_apis;
pub mod report;
