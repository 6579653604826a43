//! Models of the scanner's XML replies

pub mod report;
