pub mod data;
pub mod report;
