//! Optional TOML configuration for the command-line adapter.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use subjunctive_system_scheduler::Timespec;

/// Games the adapter knows how to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum GameKind {
    /// Think Green on a freshly seeded planet.
    #[default]
    ThinkGreen,
    /// Floorpaint on a level loaded from disk.
    Floorpaint,
}

/// Settings read from the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Game to start when none is named on the command line.
    #[serde(default)]
    pub(crate) game: Option<GameKind>,
    /// Seed for random spawning.
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Timespec between idle ticks while waiting for input, e.g. `"5s"`.
    #[serde(default)]
    pub(crate) idle_tick: Option<String>,
    /// Level used by Floorpaint when none is named on the command line.
    #[serde(default)]
    pub(crate) level: Option<String>,
}

impl Config {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid config toml")?;
        let _ = config.idle_tick()?;
        Ok(config)
    }

    /// Idle tick period, validated as a timespec.
    pub(crate) fn idle_tick(&self) -> Result<Option<Duration>> {
        self.idle_tick
            .as_deref()
            .map(|value| {
                value
                    .parse::<Timespec>()
                    .map(Timespec::duration)
                    .with_context(|| format!("invalid idle_tick {value:?}"))
            })
            .transpose()
    }
}
