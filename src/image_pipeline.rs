//! Image processing pipeline module
//!
//! Batch conversion of RAW containers: option parsing, output path
//! construction, per-file orchestration against a RAW backend, atomic
//! publishing of the result and the batch runner tying it together.

pub mod common;
pub mod conversions;
pub mod debayer;
pub mod options;
pub mod output;
pub mod paths;
pub mod raw;
pub mod render;

pub use common::{ConversionError, Result, Stage, StageFailure};

pub use options::{ExecutionConfig, ExecutionConfigBuilder, Invocation, OutputKind, parse_args};

pub use paths::PathPair;

pub use raw::{RawBackend, RawLoaderBackend};

pub use conversions::{BatchResult, BatchRunner, ConversionOutcome, ConversionPipeline};
