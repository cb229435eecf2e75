// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

pub const APP_NAME: &str = "orc-dash";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_PROGRAM: &str = "orc";
const DEFAULT_SUMMARY_ARGS: [&str; 1] = ["summary"];
const DEFAULT_REFRESH_INTERVAL: &str = "30s";
const DEFAULT_STATUS_DURATION: &str = "2s";
const DEFAULT_FRAME_DURATION: &str = "125ms";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub actions: Actions,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            ui: Ui::default(),
            actions: Actions::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    pub program: Option<String>,
    pub summary_args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub refresh_interval: Option<String>,
    pub status_duration: Option<String>,
    pub frame_duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actions {
    pub clipboard: Option<Vec<String>>,
    pub editor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ORC_DASH_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ORC_DASH_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is missing `version = 1`; add it at the top and put values under [source], [ui], [actions], and [log]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(program) = &self.source.program
            && program.trim().is_empty()
        {
            bail!("source.program in {} must not be empty", path.display());
        }

        for (key, raw) in [
            ("ui.refresh_interval", &self.ui.refresh_interval),
            ("ui.status_duration", &self.ui.status_duration),
            ("ui.frame_duration", &self.ui.frame_duration),
        ] {
            if let Some(raw) = raw {
                parse_duration(raw).with_context(|| format!("{key} in {}", path.display()))?;
            }
        }
        for (key, raw) in [
            ("ui.status_duration", &self.ui.status_duration),
            ("ui.frame_duration", &self.ui.frame_duration),
        ] {
            if let Some(raw) = raw
                && parse_duration(raw)?.is_zero()
            {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        if let Some(clipboard) = &self.actions.clipboard
            && clipboard.first().is_none_or(|program| program.trim().is_empty())
        {
            bail!(
                "actions.clipboard in {} must name a program, for example [\"pbcopy\"]",
                path.display()
            );
        }
        if let Some(editor) = &self.actions.editor
            && editor.trim().is_empty()
        {
            bail!("actions.editor in {} must not be empty", path.display());
        }

        if let Some(level) = &self.log.level {
            level.parse::<LevelFilter>().map_err(|_| {
                anyhow!(
                    "log.level in {} must be one of off, error, warn, info, debug, trace; got {level:?}",
                    path.display()
                )
            })?;
        }
        Ok(())
    }

    pub fn program(&self) -> &str {
        self.source.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    pub fn summary_args(&self) -> Vec<String> {
        match &self.source.summary_args {
            Some(args) => args.clone(),
            None => DEFAULT_SUMMARY_ARGS.map(str::to_owned).to_vec(),
        }
    }

    /// `None` when periodic refresh is disabled with a zero interval.
    pub fn refresh_interval(&self) -> Result<Option<Duration>> {
        let interval = parse_duration(
            self.ui
                .refresh_interval
                .as_deref()
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
        )?;
        Ok((!interval.is_zero()).then_some(interval))
    }

    pub fn status_duration(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .status_duration
                .as_deref()
                .unwrap_or(DEFAULT_STATUS_DURATION),
        )
    }

    pub fn frame_duration(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .frame_duration
                .as_deref()
                .unwrap_or(DEFAULT_FRAME_DURATION),
        )
    }

    pub fn clipboard(&self) -> Option<&[String]> {
        self.actions.clipboard.as_deref()
    }

    pub fn editor(&self) -> Option<&str> {
        self.actions.editor.as_deref()
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let root = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| anyhow!("cannot resolve a log directory; set [log].path"))?;
        Ok(root.join(APP_NAME).join("orc-dash.log"))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# orc-dash config\n# Place this file at: {}\n\nversion = 1\n\n[source]\n# Binary used for summary, show, focus and complete.\nprogram = \"{}\"\nsummary_args = [\"summary\"]\n\n[ui]\n# \"0s\" disables periodic refresh.\nrefresh_interval = \"{}\"\nstatus_duration = \"{}\"\nframe_duration = \"{}\"\n\n[actions]\n# Default: pbcopy on macOS, otherwise wl-copy, xclip or xsel.\n# clipboard = [\"pbcopy\"]\n# Default: $VISUAL, then $EDITOR, then vi.\n# editor = \"vim -R\"\n\n[log]\n# path = \"/absolute/path/to/orc-dash.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_PROGRAM,
            DEFAULT_REFRESH_INTERVAL,
            DEFAULT_STATUS_DURATION,
            DEFAULT_FRAME_DURATION,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 125ms or 30s)")
}
