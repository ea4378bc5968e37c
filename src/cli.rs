//! Command line entry point shared by the binary and the tests.

use std::ffi::OsString;
use std::path::Path;

use tracing::{error, info};

use crate::image_pipeline::conversions::BatchRunner;
use crate::image_pipeline::options::{parse_args, usage};

const DEFAULT_PROGRAM: &str = "raw_extract";

/// Runs a full invocation. `args` starts with the program name.
///
/// Returns the process exit status: 0 when every file was committed, 1 on a
/// usage error or when at least one file failed.
pub fn run<I, S>(args: I) -> u8
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let program = args
        .next()
        .as_deref()
        .and_then(|p| Path::new(p).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());

    let invocation = match parse_args(args) {
        Ok(invocation) => invocation,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", usage(&program));
            return 1;
        }
    };

    info!(
        kind = invocation.config.output_kind.describe(),
        files = invocation.inputs.len(),
        "Starting batch"
    );

    let runner = BatchRunner::new(invocation.config);
    let result = runner.run(&invocation.inputs);
    println!("{result}");
    result.exit_status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn no_files_is_a_usage_error() {
        assert_eq!(run(["raw_extract", "-dng"]), 1);
    }

    #[test]
    fn no_arguments_is_a_usage_error() {
        assert_eq!(run(Vec::<OsString>::new()), 1);
    }

    #[test]
    fn bad_switch_stops_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.x3f");
        fs::write(&input, b"not a raw file").unwrap();

        let status = run([
            OsString::from("raw_extract"),
            OsString::from("-matrixmax"),
            OsString::from("lots"),
            input.clone().into_os_string(),
        ]);

        assert_eq!(status, 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn undecodable_input_counts_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.x3f");
        fs::write(&input, b"not a raw file").unwrap();

        let status = run([OsString::from("raw_extract"), input.into_os_string()]);

        assert_eq!(status, 1);
        assert!(!dir.path().join("a.x3f.dng").exists());
        assert!(!dir.path().join("a.x3f.dng.tmp").exists());
    }
}
