use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{Config, EnvSnapshot, GlobalOptions};
use crate::core::format::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Format,
    Configs,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Format => "format",
            CommandGroup::Configs => "configs",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    env: EnvSnapshot,
    config: Config,
    cancel: CancellationToken,
}

impl<'a> CommandContext<'a> {
    /// Creates a new command context with the provided global options.
    ///
    /// # Errors
    /// Returns an error if the environment configuration is invalid.
    pub fn new(global: &'a GlobalOptions, cancel: CancellationToken) -> Result<Self> {
        let env = EnvSnapshot::capture();
        let config = Config::from_snapshot(&env)?;
        Ok(Self {
            global,
            env,
            config,
            cancel,
        })
    }

    #[cfg(test)]
    pub(crate) fn testing(global: &'a GlobalOptions, pairs: &[(&str, &str)]) -> Self {
        let env = EnvSnapshot::testing(pairs);
        let config = Config::from_snapshot(&env).unwrap_or_else(|err| panic!("{err}"));
        Self {
            global,
            env,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.var(key)
    }

    /// # Errors
    /// Returns an error if the working directory cannot be inspected.
    pub fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("unable to determine the working directory")
    }
}
