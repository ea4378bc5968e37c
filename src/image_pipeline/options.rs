//! Option model
//!
//! Turns command line switches into an immutable [`ExecutionConfig`].

mod parser;
pub mod types;

pub use parser::{Invocation, parse_args, usage};
pub use types::{
    ColorEncoding, ExecutionConfig, ExecutionConfigBuilder, LegacyOffset, OutputKind,
    DEFAULT_MAX_MATRIX_ELEMENTS,
};
