//! `skywatch ask`: single-question or interactive mode.

use super::CliResult;
use skywatch_core::event::EventBus;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

pub async fn run(config_path: Option<&Path>, message: Option<String>) -> CliResult<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config).await?;
    let source = super::weather_source(&config)?;
    let agent = super::build_agent(&config, store, source, Arc::new(EventBus::default()))?;

    if let Some(question) = message {
        eprint!("  Thinking...");
        let answer = agent.answer(&question).await;
        eprint!("\r              \r");
        println!("{answer}");
        return Ok(());
    }

    println!();
    println!("  SkyWatch — Interactive Mode");
    println!();
    println!("  Model:  {}", agent.model());
    println!("  Examples:");
    println!("    What is the current weather in Colombo?");
    println!("    What was the average temperature in Galle last week?");
    println!("    Compare weather in London and Paris");
    println!();
    println!("  Type 'exit' or 'quit' to stop.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        eprint!("  ...");
        let answer = agent.answer(question).await;
        eprint!("\r     \r");
        println!();
        for line in answer.lines() {
            println!("  Agent > {line}");
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
