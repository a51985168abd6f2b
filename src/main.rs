//! editdesk - task, shift and work-log tracking for editorial teams

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = editdesk::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
