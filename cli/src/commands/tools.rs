//! Tools listing command

use anyhow::Result;
use chainchat_core::tools::builtin::{CryptoInfoTool, SendEmailTool};
use chainchat_core::tools::ToolRegistry;
use chainchat_core::MailConfig;

/// Show the fixed tool set the assistant exposes to the model
pub async fn tools_command() -> Result<()> {
    let registry = ToolRegistry::new(
        CryptoInfoTool::new(),
        SendEmailTool::new(MailConfig::default()),
    );

    println!("🛠  Available tools\n");

    for definition in registry.definitions() {
        println!("  {}", definition.function.name);
        println!("      {}\n", definition.function.description);
    }

    println!("The tool set is fixed; the model cannot call anything outside it.");

    Ok(())
}
