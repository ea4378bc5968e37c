use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Could not open infile {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path too large: {what} would exceed {limit} bytes")]
    PathTooLarge { what: &'static str, limit: usize },

    #[error("Failed to decode RAW container: {0}")]
    Decode(String),

    #[error("Failed to produce output: {0}")]
    Produce(String),

    #[error("Couldn't rename {} to {}: {source}", from.display(), to.display())]
    Commit {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Step of the per-file state machine at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenInput,
    Decode,
    ProduceOutput,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::OpenInput => "open-input",
            Stage::Decode => "decode",
            Stage::ProduceOutput => "produce-output",
            Stage::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// A file-scoped error tagged with the stage that raised it.
#[derive(Error, Debug)]
#[error("{stage}: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: ConversionError,
}

pub trait AtStage<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at_stage(self, stage: Stage) -> std::result::Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}
