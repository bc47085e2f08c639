pub mod dashboard;
pub mod detail;
pub mod help;
pub mod points;
pub mod report;
