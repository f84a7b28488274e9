//! CLI command implementations for `surtitle`.
//!
//! - [`replay`] -- Drive the full listening pipeline from a transcript file.
//! - [`check`] -- Script validation and zone table.
//! - [`normalize_cmd`] -- Tokenizer preview.
//! - [`config_cmd`] -- Configuration display.

pub mod check;
pub mod config_cmd;
pub mod normalize_cmd;
pub mod replay;

use std::path::{Path, PathBuf};

use surtitle_types::{Script, SurtitleConfig};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SURTITLE_CONFIG";

/// Load configuration from the given path override or via auto-discovery.
///
/// If `config_override` is provided, loads from that path. Otherwise:
/// 1. `SURTITLE_CONFIG` env var
/// 2. `~/.surtitle/config.json`
///
/// Returns the default config if no config file is found.
pub async fn load_config(config_override: Option<&str>) -> anyhow::Result<SurtitleConfig> {
    let path = match config_override {
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                anyhow::bail!("config file not found: {path_str}");
            }
            path
        }
        None => match discover_config_path() {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
            other => {
                debug!(candidate = ?other, "no config file, using defaults");
                return Ok(SurtitleConfig::default());
            }
        },
    };

    debug!(path = %path.display(), "loading config");
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read config: {e}"))?;
    SurtitleConfig::from_json(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))
}

/// Discover the config file path without checking that it exists.
pub fn discover_config_path() -> Option<PathBuf> {
    if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::home_dir().map(|home| home.join(".surtitle").join("config.json"))
}

/// Read and validate a JSON script file.
pub async fn read_script(path: &Path) -> anyhow::Result<Script> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read script {}: {e}", path.display()))?;
    Script::from_json(&contents).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_config_missing_override_fails() {
        let err = load_config(Some("/nonexistent/surtitle/config.json")).await.unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[tokio::test]
    async fn load_config_reads_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"alignment": {"windowTokens": 20}}"#).unwrap();

        let config = load_config(path.to_str()).await.unwrap();
        assert_eq!(config.alignment.window_tokens, 20);
        assert_eq!(config.alignment.zone_tokens, 3);
    }

    #[tokio::test]
    async fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"alignment": {"entryThreshold": 9}}"#).unwrap();
        assert!(load_config(path.to_str()).await.is_err());
    }

    #[tokio::test]
    async fn read_script_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        let dup = r#"[{"id": "a", "text": "x"}, {"id": "a", "text": "y"}]"#;
        std::fs::write(&path, dup).unwrap();

        let err = read_script(&path).await.unwrap_err().to_string();
        assert!(err.contains("script.json"));
        assert!(err.contains("duplicate line id"));
    }
}
