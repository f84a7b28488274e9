//! `surtitle config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! surtitle config show
//! surtitle config show --config ./show.json
//! surtitle config path
//! ```

use surtitle_types::SurtitleConfig;

use super::discover_config_path;

/// Display the resolved configuration as formatted JSON.
pub fn config_show(config: &SurtitleConfig) {
    match serde_json::to_string_pretty(config) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to serialize config: {e}"),
    }
}

/// Print the discovered config path and whether it exists.
pub fn config_path() {
    match discover_config_path() {
        Some(path) if path.exists() => println!("{}", path.display()),
        Some(path) => println!("{} (not found, using defaults)", path.display()),
        None => println!("(no home directory, using defaults)"),
    }
}
