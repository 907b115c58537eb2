//! Shared CLI helpers: banner, response and model table printing.

use colored::Colorize;

use promptgate_core::config::Config;
use promptgate_core::utils::{split_message, truncate_for_chat};
use promptgate_core::NormalizedResult;
use promptgate_providers::{ModelRegistry, ProviderClass};

const ENDPOINTS: &[(&str, &str)] = &[
    ("GET  /ai", "prompt, model"),
    ("POST /ai", "{prompt, model}"),
    ("POST /batch", "{prompts, model}"),
    ("GET  /api/models", ""),
    ("GET  /api/image", "prompt"),
    ("GET  /health", ""),
];

/// Print the startup banner.
pub fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let models = ModelRegistry::builtin().len();
    println!();
    println!("{}  v{}", "⚡ PromptGate".cyan().bold(), version.dimmed());
    println!(
        "  {} http://{}:{}",
        "Listening:".bold(),
        config.server.host,
        config.server.port
    );
    println!(
        "  {} {} (default: {})",
        "Models:".bold(),
        models,
        config.dispatch.default_model
    );
    println!("  {}", "Endpoints:".bold());
    for (route, params) in ENDPOINTS {
        println!("    {:<18} {}", route, params.dimmed());
    }
    println!();
}

/// Render an answer for the terminal.
///
/// `max_chars` applies chat-style truncation first; `chunk` then splits the
/// result into numbered parts.
pub fn render_response(text: &str, max_chars: Option<usize>, chunk: Option<usize>) -> Vec<String> {
    let text = match max_chars {
        Some(max) if max > 0 => truncate_for_chat(text, max),
        _ => text.to_string(),
    };
    match chunk {
        Some(size) if size > 0 => split_message(&text, size),
        _ => vec![text],
    }
}

/// Print a dispatch result to stdout.
pub fn print_response(result: &NormalizedResult, max_chars: Option<usize>, chunk: Option<usize>) {
    println!();
    let mut header = format!("⚡ {}", result.model).cyan().bold().to_string();
    if let Some(ref from) = result.fallback_from {
        header.push_str(&format!(" {}", format!("(fallback from {from})").yellow()));
    }
    println!("{header}  {}", result.source_provider.dimmed());

    let parts = render_response(&result.text, max_chars, chunk);
    let numbered = parts.len() > 1;
    for (i, part) in parts.iter().enumerate() {
        if numbered {
            println!("{}", format!("[{}/{}]", i + 1, parts.len()).dimmed());
        }
        println!("{part}");
    }
    println!();
}

/// Print the model registry as a table.
pub fn print_models(registry: &ModelRegistry) {
    println!();
    println!("{}", "⚡ PromptGate Models".cyan().bold());
    println!();
    for model in registry.iter() {
        let class = match model.provider_class {
            ProviderClass::Default => model.provider_class.as_str().green(),
            ProviderClass::Pooled => model.provider_class.as_str().blue(),
            ProviderClass::ImageGen => model.provider_class.as_str().magenta(),
        };
        println!("  {:<12} {:<28} {}", model.id.bold(), model.display_name, class);
    }
    println!();
    println!("  {} models", registry.len());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
