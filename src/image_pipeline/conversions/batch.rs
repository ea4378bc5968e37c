use std::fmt;
use std::path::Path;

use tracing::{error, info};

use crate::image_pipeline::{
    common::{
        error::{AtStage, Stage, StageFailure},
        timing::StageTimings,
    },
    conversions::{commit::commit, orchestrator::ConversionPipeline},
    options::ExecutionConfig,
    paths::PathPair,
    raw::{RawBackend, RawLoaderBackend},
};

/// Result of converting one file.
#[derive(Debug)]
pub enum ConversionOutcome {
    Success,
    Failure(StageFailure),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success)
    }
}

/// Counters accumulated over a batch. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub files_seen: usize,
    pub errors: usize,
}

impl BatchResult {
    fn record(&mut self, outcome: &ConversionOutcome) {
        self.files_seen += 1;
        if !outcome.is_success() {
            self.errors += 1;
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// 0 when every file was committed, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Files processed: {}\terrors: {}", self.files_seen, self.errors)
    }
}

/// Converts a list of files one after the other. A failing file is logged
/// and counted; the batch always continues with the next one.
pub struct BatchRunner<B: RawBackend> {
    pipeline: ConversionPipeline<B>,
}

impl BatchRunner<RawLoaderBackend> {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            pipeline: ConversionPipeline::new(config),
        }
    }
}

impl<B: RawBackend> BatchRunner<B> {
    pub fn with_pipeline(pipeline: ConversionPipeline<B>) -> Self {
        Self { pipeline }
    }

    pub fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> BatchResult {
        let mut result = BatchResult::default();
        for input in inputs {
            let outcome = self.process_file(input.as_ref());
            result.record(&outcome);
        }
        info!(files = result.files_seen, errors = result.errors, "Batch complete");
        result
    }

    /// Runs one file through open, decode, produce and commit.
    pub fn process_file(&self, input: &Path) -> ConversionOutcome {
        let _span = tracing::info_span!("file", path = %input.display()).entered();
        let mut timings = StageTimings::new();

        let outcome = match self.convert(input, &mut timings) {
            Ok(()) => ConversionOutcome::Success,
            Err(failure) => {
                error!(
                    input = %input.display(),
                    stage = %failure.stage,
                    "{}",
                    failure.error
                );
                ConversionOutcome::Failure(failure)
            }
        };
        timings.log_summary();
        outcome
    }

    fn convert(&self, input: &Path, timings: &mut StageTimings) -> Result<(), StageFailure> {
        let config = self.pipeline.config();

        let mut container = timings.time("open", || {
            let _span = tracing::info_span!("open").entered();
            self.pipeline.open(input)
        })?;

        timings.time("decode", || {
            let _span = tracing::info_span!("decode").entered();
            self.pipeline.load(&mut container)
        })?;

        let paths = PathPair::build(
            input,
            config.output_dir.as_deref(),
            config.output_kind.extension(),
        )
        .at_stage(Stage::ProduceOutput)?;

        timings.time("produce", || {
            let _span = tracing::info_span!("produce").entered();
            self.pipeline.produce(&container, &paths)
        })?;
        drop(container);

        timings.time("commit", || {
            let _span = tracing::info_span!("commit").entered();
            commit(&paths).at_stage(Stage::Commit)
        })
    }
}
