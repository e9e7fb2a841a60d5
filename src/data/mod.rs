//! Data sources.
//!
//! Real runs read lab text files (see `io::ingest`); this module generates
//! synthetic ones so the tool can be exercised without measurement data.

pub mod sample;

pub use sample::*;
