pub mod acquisition;
pub mod classify;
pub mod extractors;
pub mod merge;
pub mod privacy;
pub mod processor;

pub use classify::{classify, ClassificationResult};
pub use processor::{process, process_with_audit, ProcessingOutcome};
