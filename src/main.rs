//! Binary entrypoint for the `runbook` CLI.

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env is loaded before logging so LOG_LEVEL can come from it.
    dotenvy::dotenv().ok();
    runbook::logging::init();

    match runbook::run(std::env::args()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
