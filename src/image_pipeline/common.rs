//! Common utilities module
//!
//! This module contains shared utilities used across the image pipeline.

pub mod error;
pub mod timing;

pub use error::{AtStage, ConversionError, Result, Stage, StageFailure};
pub use timing::{StageTimings, StepTiming, Timer};
