//! facepack - ordered registry of character face images

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = facepack_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
