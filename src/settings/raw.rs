use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

use pounce::{SearchMode, ToolPaths};

use super::resolved::{DEFAULT_CONTEXT_LINES, ResolvedConfig};
use crate::cli::CliArgs;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
    tools: ToolsSection,
    preview: PreviewSection,
    ui: UiSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ToolsSection {
    rg_path: Option<PathBuf>,
    fd_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PreviewSection {
    context_lines: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct UiSection {
    auto_close: Option<bool>,
}

impl RawConfig {
    /// Apply CLI overrides on top of the raw configuration values.
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(path) = &cli.rg_path {
            self.tools.rg_path = Some(path.clone());
        }
        if let Some(path) = &cli.fd_path {
            self.tools.fd_path = Some(path.clone());
        }
        if let Some(context) = cli.context {
            self.preview.context_lines = Some(context);
        }
    }

    /// Convert the raw configuration into a [`ResolvedConfig`], validating
    /// and filling defaults where required.
    pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
        let defaults = ToolPaths::default();
        let tools = ToolPaths {
            rg: self.tools.rg_path.unwrap_or(defaults.rg),
            fd: self.tools.fd_path.unwrap_or(defaults.fd),
        };

        let directories = if cli.directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            cli.directories.clone()
        };

        let mode = if cli.files {
            SearchMode::Files
        } else {
            SearchMode::Content
        };

        let config = ResolvedConfig {
            query: cli.query.clone(),
            directories,
            mode,
            tools,
            context_lines: self
                .preview
                .context_lines
                .unwrap_or(DEFAULT_CONTEXT_LINES),
            auto_close: self.ui.auto_close.unwrap_or(true),
        };

        config.validate()?;
        Ok(config.absolutize()?)
    }
}
