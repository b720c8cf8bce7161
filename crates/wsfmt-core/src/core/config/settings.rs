use std::collections::HashMap;
use std::env;
use std::thread;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const MAX_JOBS: usize = 16;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn flag_is_enabled(&self, key: &str) -> bool {
        matches!(self.vars.get(key).map(String::as_str), Some("1"))
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug)]
pub struct Config {
    pub(crate) format: FormatConfig,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    ///
    /// # Errors
    /// Returns an error if a `WSFMT_*` variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let requested = match snapshot.var("WSFMT_JOBS").map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| anyhow!("WSFMT_JOBS must be a positive integer, got `{raw}`"))?,
            ),
        };
        let available = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4)
            .max(1);
        let progress = snapshot.var("WSFMT_PROGRESS").map(|value| {
            let lowered = value.trim().to_ascii_lowercase();
            !matches!(lowered.as_str(), "0" | "false" | "no" | "off")
        });
        Ok(Self {
            format: FormatConfig {
                jobs: requested.unwrap_or(available).clamp(1, MAX_JOBS),
                progress,
                timings: snapshot.flag_is_enabled("WSFMT_TIMINGS"),
            },
        })
    }

    #[must_use]
    pub fn format(&self) -> &FormatConfig {
        &self.format
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormatConfig {
    /// Worker threads used inside one formatting pass.
    pub jobs: usize,
    /// Explicit progress preference; `None` defers to whether stderr is a terminal.
    pub progress: Option<bool>,
    pub timings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_are_clamped() {
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[("WSFMT_JOBS", "64")])).unwrap();
        assert_eq!(config.format().jobs, MAX_JOBS);

        let config = Config::from_snapshot(&EnvSnapshot::testing(&[("WSFMT_JOBS", "0")])).unwrap();
        assert_eq!(config.format().jobs, 1);

        let config = Config::from_snapshot(&EnvSnapshot::testing(&[])).unwrap();
        assert!((1..=MAX_JOBS).contains(&config.format().jobs));
    }

    #[test]
    fn invalid_jobs_value_is_rejected() {
        let err = Config::from_snapshot(&EnvSnapshot::testing(&[("WSFMT_JOBS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("WSFMT_JOBS"));
    }

    #[test]
    fn progress_handles_common_falsey_values() {
        for value in ["0", "off", "no", "false"] {
            let snapshot = EnvSnapshot::testing(&[("WSFMT_PROGRESS", value)]);
            let config = Config::from_snapshot(&snapshot).unwrap();
            assert_eq!(config.format().progress, Some(false), "{value}");
        }
        let config =
            Config::from_snapshot(&EnvSnapshot::testing(&[("WSFMT_PROGRESS", "1")])).unwrap();
        assert_eq!(config.format().progress, Some(true));
        let config = Config::from_snapshot(&EnvSnapshot::testing(&[])).unwrap();
        assert_eq!(config.format().progress, None);
    }
}
