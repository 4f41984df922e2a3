//! Scan and write services

pub mod cover_art;
pub mod file_scanner;
pub mod orchestrator;
pub mod writer;
