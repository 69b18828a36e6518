#![deny(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use cli::ReceiverArgs;

fn main() -> ExitCode {
    let args = ReceiverArgs::parse();
    logging::init(args.verbose);

    match transfer::run_receiver(&args) {
        Ok(()) => core::ExitCode::Success.into(),
        Err(err) => {
            eprintln!("xfer-recv: {err}");
            err.exit_code().into()
        }
    }
}
