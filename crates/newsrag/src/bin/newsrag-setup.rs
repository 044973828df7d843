//! One-shot setup: recreate the article collection and load the dataset.
//! Run after `docker compose up -d`.

use std::process::ExitCode;
use std::sync::Arc;

use newsrag::core::NewsragError;
use newsrag::loaders::DatasetLoader;
use newsrag::weaviate::{HttpBackend, WeaviateClient};
use newsrag::{init_tracing, report_failure, setup_collection, Settings};
use tracing::info;

async fn run() -> Result<(), NewsragError> {
    let settings = Settings::from_env()?;
    info!(
        collection = %settings.collection,
        dataset = %settings.dataset.display(),
        "setting up collection"
    );

    let client = WeaviateClient::connect(
        settings.weaviate,
        settings.readiness,
        Arc::new(HttpBackend::new()),
    )
    .await?;

    let loader = DatasetLoader::new(&settings.dataset);
    let result = setup_collection(&client, &loader, &settings.collection, &settings.batch).await;
    client.close();
    let report = result?;

    println!(
        "Loaded {} objects into '{}'{}.",
        report.summary.inserted,
        report.collection,
        report
            .count
            .map(|n| format!(" (server reports {n})"))
            .unwrap_or_default()
    );
    println!("Setup completed successfully. You can now run the notebook.");
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
