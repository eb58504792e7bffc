//! `skywatch serve`: scheduler plus HTTP API.

use super::CliResult;
use skywatch_core::event::EventBus;
use skywatch_gateway::GatewayState;
use skywatch_pipeline::Scheduler;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub async fn run(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let config = super::load_config(config_path)?;

    // Startup failures are fatal
    let store = super::open_store(&config).await?;
    config.require_openai_key()?;
    let source = super::weather_source(&config)?;

    let events = Arc::new(EventBus::default());
    let pipeline = Arc::new(super::build_pipeline(
        &config,
        source.clone(),
        store.clone(),
        events.clone(),
    ));
    let agent = Arc::new(super::build_agent(&config, store.clone(), source, events)?);

    println!("SkyWatch — starting");
    println!("   Cities:    {}", pipeline.cities().len());
    println!(
        "   Schedule:  every {} min (initial run: {})",
        config.scheduler.interval_minutes,
        if config.scheduler.run_initial_fetch { "yes" } else { "no" }
    );
    println!("   Model:     {}", config.llm.model);

    let scheduler = Scheduler::new(
        pipeline,
        Duration::from_secs(config.scheduler.interval_minutes.saturating_mul(60)),
    )
    .with_initial_run(config.scheduler.run_initial_fetch)
    .start();

    let addr = format!(
        "{}:{}",
        config.gateway.host,
        port.unwrap_or(config.gateway.port)
    );
    let served = skywatch_gateway::serve(
        Arc::new(GatewayState { agent, store }),
        &addr,
        shutdown_signal(),
    )
    .await;

    info!("Stopping scheduler");
    scheduler.stop().await;
    served?;

    println!("SkyWatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
