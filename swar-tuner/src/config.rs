use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use swar_core::{ScaleRoot, SwarMode, TunerConfig};

use crate::cli::{Cli, ModeArg};

/// Config file picked up from the working directory when `--config` is absent.
const LOCAL_CONFIG: &str = "swar.toml";

/// Reads a TOML tuner config.
pub fn load_config(path: &Path) -> Result<TunerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Builds the effective config: file first, then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<TunerConfig> {
    let path = cli.config.clone().or_else(|| {
        let local = PathBuf::from(LOCAL_CONFIG);
        local.exists().then_some(local)
    });

    let mut config = match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            load_config(&path)?
        }
        None => TunerConfig::default(),
    };

    if let Some(root) = &cli.root {
        config.scale_root = ScaleRoot::from_name(root).context("Invalid --root")?;
    }
    if let Some(mode) = cli.mode {
        config.swar_mode = match mode {
            ModeArg::Chromatic => SwarMode::Chromatic,
            ModeArg::Natural => SwarMode::Natural,
        };
    }

    config.validate().context("Invalid tuner configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_defaults() {
        let config: TunerConfig = toml::from_str(
            r#"
            scale_root = 2
            swar_mode = "natural"
            min_hold_ms = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.scale_root.index(), 2);
        assert_eq!(config.swar_mode, SwarMode::Natural);
        assert_eq!(config.min_hold_ms, 80);
        assert_eq!(config.reset_window_ms, 300);
    }

    #[test]
    fn test_toml_rejects_bad_root() {
        assert!(toml::from_str::<TunerConfig>("scale_root = 15").is_err());
    }
}
