//! Wait for the local Weaviate to come up and open a session, the same check
//! the notebooks run before their first query.

use std::process::ExitCode;
use std::sync::Arc;

use newsrag::core::NewsragError;
use newsrag::weaviate::{HttpBackend, WeaviateClient};
use newsrag::{init_tracing, report_failure, Settings};

async fn run() -> Result<(), NewsragError> {
    let settings = Settings::from_env()?;
    let client = WeaviateClient::connect(
        settings.weaviate,
        settings.readiness,
        Arc::new(HttpBackend::new()),
    )
    .await?;

    println!(
        "Connected to Weaviate {} at {}",
        client.meta().version,
        client.config().base_url()
    );
    client.close();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
