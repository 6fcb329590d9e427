//! Integration tests for the processor module
//!
//! Builds small derived-parameter archives on disk and runs the extraction
//! pipeline against them.

pub mod extract;
