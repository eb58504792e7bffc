//! `skywatch collect`: run the pipeline once.

use super::CliResult;
use skywatch_core::event::EventBus;
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    let source = super::weather_source(&config)?;
    let pipeline = super::build_pipeline(&config, source, store, Arc::new(EventBus::default()));

    println!("Collecting weather for {} cities...", pipeline.cities().len());
    let report = pipeline.run().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
