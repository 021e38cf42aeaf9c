//! Interactive console conversation loop

use crate::config::CliConfigLoader;
use anyhow::Result;
use chainchat_core::{AgentConfig, AgentCore};
use std::io::{self, BufRead, Write};

/// Run the read-print conversation loop until the user exits
pub async fn chat_command(loader: CliConfigLoader) -> Result<()> {
    // Configuration problems (notably a missing chat API key) abort here,
    // before any conversation happens
    let (llm_config, mail_config) = loader.load()?;
    tracing::debug!(model = %llm_config.model, "configuration resolved");
    let mut agent = AgentCore::new(AgentConfig::default(), &llm_config, mail_config)?;

    println!("Welcome to the Crypto Assistant! Type 'exit' to end the conversation.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("You: ");
        io::stdout().flush()?;

        // EOF ends the session like an exit
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            println!("Thank you for using the Crypto Assistant. Goodbye!");
            break;
        }

        let reply = agent.chat(input).await;
        println!("Assistant: {}", reply);
    }

    Ok(())
}

/// The case-insensitive keyword that terminates the loop without a model call
fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit")
}
