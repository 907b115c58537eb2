//! `promptgate init`: write a default config file.

use anyhow::{Context, Result};
use colored::Colorize;

use promptgate_core::config::{get_config_path, save_config, Config};

/// Run the init command.
pub fn run(force: bool) -> Result<()> {
    println!();
    println!("{}", "⚡ PromptGate — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() && !force {
        println!(
            "  {} config already exists at {} (use --force to overwrite)",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!("  Next: {}", "promptgate serve".bold());
    println!();
    Ok(())
}
