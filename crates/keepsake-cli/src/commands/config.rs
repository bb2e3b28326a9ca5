//! Config command - print the resolved configuration.

use anyhow::Result;
use colored::Colorize;
use keepsake_config::ResolvedConfig;

/// Print the merged configuration annotated with the layer each value came
/// from, preceded by where the slot store and logs live.
pub(crate) fn show_config(resolved: &ResolvedConfig) -> Result<()> {
    let logging = &resolved.config.logging;
    println!("{}", "keepsake configuration".bold().cyan());
    println!("{}", format!("store: {}", resolved.storage_path().display()).dimmed());
    if logging.target == "file" {
        let dir = logging.resolved_directory(&resolved.home);
        println!("{}", format!("logs:  {}", dir.display()).dimmed());
    }
    println!();
    print!("{}", resolved.show_toml()?);
    Ok(())
}
