//! Export: learner payloads built from goal trees, written per situation,
//! in batch, or as a zip archive.

pub mod archive;
pub mod batch;
pub mod payload;
