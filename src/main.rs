use std::process::ExitCode;

use raw_extract::{cli, logger};

fn main() -> ExitCode {
    logger::init();
    ExitCode::from(cli::run(std::env::args_os()))
}
