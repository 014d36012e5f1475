//! mspx - Gantt project data to MS Project XML and back

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mspx::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
