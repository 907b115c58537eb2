//! Config loader: reads `~/.promptgate/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Built-in defaults
//! 2. JSON file at `~/.promptgate/config.json`
//! 3. Environment variables `PROMPTGATE_<SECTION>__<FIELD>` and the legacy
//!    `PORT`, `EXTERNAL_API_URL`, `EXTERNAL_API_TOKEN`, `API_TIMEOUT` names

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::schema::{Config, UpstreamConfig};

/// `~/.promptgate/config.json`.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load the config file (default location unless `path` is given), then
/// apply env overrides.
///
/// A missing or unreadable file is not an error: defaults are used and the
/// problem is logged.
pub fn load_config(path: Option<&Path>) -> Config {
    let file = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    apply_env_overrides(file_or_default(&file))
}

fn file_or_default(path: &Path) -> Config {
    match read_config_file(path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            info!(path = %path.display(), "No config file, using defaults");
            Config::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unusable config file");
            Config::default()
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn read_config_file(path: &Path) -> std::io::Result<Option<Config>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let config = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "Config file loaded");
    Ok(Some(config))
}

/// Write `config` as pretty camelCase JSON, creating parent directories.
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let target = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    std::fs::write(&target, json)?;
    debug!(path = %target.display(), "Config written");
    Ok(())
}

/// Layer env vars over a loaded config.
///
/// Prefixed format: `PROMPTGATE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `PROMPTGATE_SERVER__HOST`, `PROMPTGATE_SERVER__PORT`
/// - `PROMPTGATE_PROVIDERS__<DEFAULT|POOLED|IMAGE>__API_BASE | __API_KEY | __TIMEOUT_SECS`
/// - `PROMPTGATE_DISPATCH__DEFAULT_MODEL`, `__REQUEST_TIMEOUT_SECS`,
///   `__IMAGE_ENDPOINT_TIMEOUT_SECS`, `__BATCH_CONCURRENCY`
///
/// Legacy names (applied first, so the prefixed form wins):
/// - `PORT` → `server.port`
/// - `EXTERNAL_API_URL` → `providers.default.api_base`
/// - `EXTERNAL_API_TOKEN` → `providers.default.api_key`
/// - `API_TIMEOUT` (milliseconds) → `providers.default.timeout_secs`
fn apply_env_overrides(mut config: Config) -> Config {
    apply_legacy_env(&mut config);

    // Server
    if let Ok(val) = std::env::var("PROMPTGATE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(port) = parse_env("PROMPTGATE_SERVER__PORT") {
        config.server.port = port;
    }

    // Providers
    apply_upstream_env(&mut config.providers.default, "DEFAULT");
    apply_upstream_env(&mut config.providers.pooled, "POOLED");
    apply_upstream_env(&mut config.providers.image, "IMAGE");

    // Dispatch
    if let Ok(val) = std::env::var("PROMPTGATE_DISPATCH__DEFAULT_MODEL") {
        config.dispatch.default_model = val;
    }
    if let Some(secs) = parse_env("PROMPTGATE_DISPATCH__REQUEST_TIMEOUT_SECS") {
        config.dispatch.request_timeout_secs = secs;
    }
    if let Some(secs) = parse_env("PROMPTGATE_DISPATCH__IMAGE_ENDPOINT_TIMEOUT_SECS") {
        config.dispatch.image_endpoint_timeout_secs = secs;
    }
    if let Some(n) = parse_env::<usize>("PROMPTGATE_DISPATCH__BATCH_CONCURRENCY") {
        config.dispatch.batch_concurrency = n.max(1);
    }

    config
}

fn apply_legacy_env(config: &mut Config) {
    if let Some(port) = parse_env("PORT") {
        config.server.port = port;
    }
    if let Ok(val) = std::env::var("EXTERNAL_API_URL") {
        config.providers.default.api_base = Some(val);
    }
    if let Ok(val) = std::env::var("EXTERNAL_API_TOKEN") {
        config.providers.default.api_key = Some(val);
    }
    if let Some(ms) = parse_env::<u64>("API_TIMEOUT") {
        // Round up so sub-second values never become a zero deadline.
        config.providers.default.timeout_secs = Some(ms.div_ceil(1000).max(1));
    }
}

/// Apply env var overrides for a single upstream.
fn apply_upstream_env(upstream: &mut UpstreamConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("PROMPTGATE_PROVIDERS__{name}__API_BASE")) {
        upstream.api_base = Some(val);
    }
    if let Ok(val) = std::env::var(format!("PROMPTGATE_PROVIDERS__{name}__API_KEY")) {
        upstream.api_key = Some(val);
    }
    if let Some(secs) = parse_env(&format!("PROMPTGATE_PROVIDERS__{name}__TIMEOUT_SECS")) {
        upstream.timeout_secs = Some(secs);
    }
}

/// Read and parse an env var; unparseable values are ignored with a warning.
fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable env override");
            None
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        assert!(read_config_file(&path).unwrap().is_none());

        let config = file_or_default(&path);
        assert_eq!(config.server.port, 25586);
        assert_eq!(config.dispatch.default_model, "dtempire");
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = config_file(
            &dir,
            r#"{
                "server": { "port": 8080 },
                "providers": {
                    "default": { "apiBase": "http://localhost:9000/ai", "timeoutSecs": 3 }
                }
            }"#,
        );

        let config = file_or_default(&path);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.providers.default.api_base.as_deref(),
            Some("http://localhost:9000/ai")
        );
        assert_eq!(config.providers.default.timeout_secs, Some(3));
        assert!(config.providers.pooled.api_base.is_none());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = config_file(&dir, "{ \"server\": ");
        assert!(read_config_file(&path).is_err());
        assert_eq!(file_or_default(&path).server.port, 25586);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.dispatch.default_model = "grok".to_string();
        config.providers.pooled.api_key = Some("pool-key".to_string());
        save_config(&config, Some(&path)).unwrap();

        let reloaded = file_or_default(&path);
        assert_eq!(reloaded.dispatch.default_model, "grok");
        assert_eq!(reloaded.providers.pooled.api_key.as_deref(), Some("pool-key"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["dispatch"]["requestTimeoutSecs"], 30);
        assert!(raw["dispatch"].get("request_timeout_secs").is_none());
    }

    #[test]
    fn test_env_sets_pooled_key() {
        std::env::set_var("PROMPTGATE_PROVIDERS__POOLED__API_KEY", "env-pool-key");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("PROMPTGATE_PROVIDERS__POOLED__API_KEY");
        assert_eq!(config.providers.pooled.api_key.as_deref(), Some("env-pool-key"));
    }

    #[test]
    fn test_env_sets_image_timeout() {
        std::env::set_var("PROMPTGATE_PROVIDERS__IMAGE__TIMEOUT_SECS", "12");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("PROMPTGATE_PROVIDERS__IMAGE__TIMEOUT_SECS");
        assert_eq!(config.providers.image.timeout_secs, Some(12));
    }

    #[test]
    fn test_env_garbage_is_ignored() {
        std::env::set_var("PROMPTGATE_DISPATCH__REQUEST_TIMEOUT_SECS", "soon");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("PROMPTGATE_DISPATCH__REQUEST_TIMEOUT_SECS");
        assert_eq!(config.dispatch.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_batch_concurrency_is_at_least_one() {
        std::env::set_var("PROMPTGATE_DISPATCH__BATCH_CONCURRENCY", "0");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("PROMPTGATE_DISPATCH__BATCH_CONCURRENCY");
        assert_eq!(config.dispatch.batch_concurrency, 1);
    }

    #[test]
    fn test_legacy_env_names() {
        std::env::set_var("EXTERNAL_API_URL", "http://legacy.local/ai");
        std::env::set_var("EXTERNAL_API_TOKEN", "legacy-token");
        std::env::set_var("API_TIMEOUT", "2500");
        let config = apply_env_overrides(Config::default());
        std::env::remove_var("EXTERNAL_API_URL");
        std::env::remove_var("EXTERNAL_API_TOKEN");
        std::env::remove_var("API_TIMEOUT");

        assert_eq!(
            config.providers.default.api_base.as_deref(),
            Some("http://legacy.local/ai")
        );
        assert_eq!(config.providers.default.api_key.as_deref(), Some("legacy-token"));
        assert_eq!(config.providers.default.timeout_secs, Some(3));
    }
}
