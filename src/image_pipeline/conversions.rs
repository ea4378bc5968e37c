//! Pipeline conversions module
//!
//! Per-file orchestration, atomic publishing of outputs and the batch runner.

mod batch;
mod commit;
mod orchestrator;


pub use batch::{BatchResult, BatchRunner, ConversionOutcome};
pub use commit::commit;
pub use orchestrator::ConversionPipeline;
