use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use rust_city_opt::optimization::config::CommandLineArgs;
use rust_city_opt::optimization::logging::init_console_logging_thread_local;
use rust_city_opt::optimization::runner;

fn main() -> ExitCode {
    let _guard = init_console_logging_thread_local();

    let args = CommandLineArgs::parse();
    match runner::run(&args) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to print result: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
