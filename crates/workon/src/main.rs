mod cli;
mod commands;
mod environments;
mod error;
mod logging;
mod settings;
mod storage;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::error::AppError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| AppError::io("Failed to start async runtime", error))
        .and_then(|runtime| runtime.block_on(commands::dispatch(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut messages = error.chain().into_iter();
            if let Some(first) = messages.next() {
                eprintln!("error: {first}");
            }
            for cause in messages {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}
