//! The selection-to-overlay pipeline: scan, group, dispatch, splice.

pub mod dispatcher;
pub mod grouper;
pub mod scanner;
pub mod splicer;

pub use dispatcher::{AggregateResult, Dispatcher, TranslationOutcome};
pub use grouper::{group, TranslationUnit, STRUCTURAL_TAGS};
pub use scanner::{scan, TextLeaf};
pub use splicer::splice;
