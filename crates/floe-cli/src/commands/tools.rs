//! `floe tools list` - list the tools a configuration exposes (offline).

use anyhow::Result;
use floe_core::FloeConfig;
use floe_mcp::{ToolDefinition, ToolRegistry};

pub fn list(config: &FloeConfig, verbose: bool) -> Result<()> {
    let registry = ToolRegistry::for_server(&config.server);
    let tools: Vec<&ToolDefinition> = registry.list().collect();

    println!("\n🔧 Available Tools ({}):", tools.len());

    for tool in &tools {
        println!("   • {} ({})", tool.name, badge(tool));

        if let Some(desc) = &tool.description {
            println!("     {}", desc);
        }

        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }

    if !config.server.exclude_tools.is_empty() {
        println!("\n🚫 Excluded: {}", config.server.exclude_tools.join(", "));
    }

    if registry.has_write_tools() {
        println!("\n⚠️  Write tools are listed but every call to them is refused.");
    }

    println!();

    Ok(())
}

fn badge(tool: &ToolDefinition) -> &'static str {
    if tool.is_read_only() { "read" } else { "write" }
}
