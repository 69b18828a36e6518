#![deny(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use cli::SenderArgs;

fn main() -> ExitCode {
    let args = SenderArgs::parse();
    logging::init(args.verbose);

    match transfer::run_sender(&args) {
        Ok(()) => core::ExitCode::Success.into(),
        Err(err) => {
            eprintln!("xfer-send: {err}");
            err.exit_code().into()
        }
    }
}
