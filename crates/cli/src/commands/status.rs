//! `skywatch status`: configuration summary and record counts.

use super::CliResult;
use skywatch_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config = super::load_config(config_path)?;
    let set = |key: &Option<String>| if key.is_some() { "set" } else { "missing" };

    println!("SkyWatch Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Model:        {} ({})", config.llm.model, config.llm.base_url);
    println!("  OpenAI key:   {}", set(&config.openai_api_key));
    println!("  Weather key:  {}", set(&config.weather_api_key));
    println!("  Weather API:  {}", config.weather.base_url);
    println!(
        "  Cities:       {}",
        skywatch_weather::cities::resolve(&config.cities).len()
    );
    println!("  Interval:     {} min", config.scheduler.interval_minutes);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Database:     {}", config.database.url);

    match super::open_store(&config).await {
        Ok(store) => {
            let cleaned = store.count().await?;
            let raw = store.raw_count().await?;
            println!("  Records:      {cleaned} cleaned, {raw} raw");
        }
        Err(e) => println!("\n  Store unavailable: {e}"),
    }

    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if config_file.exists() {
        println!("\n  Config file found: {}", config_file.display());
    } else {
        println!("\n  No config file — run `skywatch init-config` to create one");
    }

    Ok(())
}
