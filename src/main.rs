use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    triage_engine::init_tracing();

    match triage_engine::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
