//! Schedule extraction
//!
//! The live document is read once after it renders; parsing itself is pure
//! and works on the captured page source.

pub mod document;
pub mod extractor;
pub mod schema;

pub use document::{scan_document, ScheduleScan};
pub use extractor::ScheduleExtractor;
pub use schema::{CompiledSelectors, SelectorSet};
