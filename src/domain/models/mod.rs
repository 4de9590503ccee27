pub mod owner;
pub mod report;
pub mod repository;
pub mod run;
