//! Binary entrypoint for the `goodmod` CLI.

use std::process::ExitCode;

use goodmod::Error;

fn main() -> ExitCode {
    // Recording and replay are handled in commands::dispatch via
    // GOODMOD_RECORD=<file> and GOODMOD_REPLAY=<file>.
    match goodmod::run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::HelpShown) => exit_code(goodmod::error::HELP_EXIT_CODE),
        Err(Error::Cli(err)) => {
            let _ = err.print();
            exit_code(err.exit_code())
        }
        Err(err) => {
            eprintln!("ERROR: {err}");
            exit_code(err.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
