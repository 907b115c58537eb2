//! `promptgate status`: show configuration and upstream status.

use anyhow::Result;
use colored::Colorize;

use promptgate_core::config::schema::UpstreamConfig;
use promptgate_core::config::{get_config_path, load_config};
use promptgate_providers::http_provider::{UpstreamDefaults, UpstreamSettings};
use promptgate_providers::{DefaultAdapter, ImageGenAdapter, PooledAdapter};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "⚡ PromptGate Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );
    println!(
        "  {:<18} {}:{}",
        "Listen:".bold(),
        config.server.host,
        config.server.port
    );
    println!(
        "  {:<18} {}",
        "Default model:".bold(),
        config.dispatch.default_model
    );
    println!(
        "  {:<18} {} | image: {} | batch: {}",
        "Budgets:".bold(),
        format!("request: {}s", config.dispatch.request_timeout_secs).dimmed(),
        format!("{}s", config.dispatch.image_endpoint_timeout_secs).dimmed(),
        format!("{} in flight", config.dispatch.batch_concurrency).dimmed(),
    );

    println!();
    println!("  {}", "Upstreams:".bold());
    let upstreams = [
        (DefaultAdapter::NAME, &config.providers.default, DefaultAdapter::DEFAULTS),
        (PooledAdapter::NAME, &config.providers.pooled, PooledAdapter::DEFAULTS),
        (ImageGenAdapter::NAME, &config.providers.image, ImageGenAdapter::DEFAULTS),
    ];
    for (name, upstream, defaults) in upstreams {
        println!("    {}", describe_upstream(name, upstream, defaults));
    }
    println!();

    Ok(())
}

/// One status line for an upstream. Never prints the credential itself.
fn describe_upstream(
    name: &'static str,
    upstream: &UpstreamConfig,
    defaults: UpstreamDefaults,
) -> String {
    match UpstreamSettings::resolve(name, upstream, defaults) {
        Ok(settings) => {
            let key = if settings.api_key.is_some() {
                "key set".green()
            } else {
                "key not set".dimmed()
            };
            format!(
                "{:<10} {} ({}, {}s)",
                name,
                settings.base,
                key,
                settings.timeout.as_secs()
            )
        }
        Err(e) => format!("{:<10} {} {}", name, "✗".red(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_hides_credentials() {
        colored::control::set_override(false);
        let upstream = UpstreamConfig {
            api_base: Some("https://example.com/v1".into()),
            api_key: Some("super-secret".into()),
            timeout_secs: Some(3),
        };
        let line = describe_upstream("raqkid", &upstream, PooledAdapter::DEFAULTS);
        assert!(line.contains("https://example.com/v1"));
        assert!(line.contains("key set"));
        assert!(line.contains("3s"));
        assert!(!line.contains("super-secret"));
    }

    #[test]
    fn test_describe_uses_defaults() {
        colored::control::set_override(false);
        let line = describe_upstream(
            "dtempire",
            &UpstreamConfig::default(),
            DefaultAdapter::DEFAULTS,
        );
        assert!(line.contains("158.69.214.8:9853"));
        assert!(line.contains("key not set"));
        assert!(line.contains("8s"));
    }

    #[test]
    fn test_describe_reports_bad_base() {
        colored::control::set_override(false);
        let upstream = UpstreamConfig {
            api_base: Some("not a url".into()),
            ..Default::default()
        };
        let line = describe_upstream("image", &upstream, ImageGenAdapter::DEFAULTS);
        assert!(line.contains("✗"));
    }
}
