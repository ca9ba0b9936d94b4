/*
 * vSMTP mail transfer agent
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

use crate::{CheckConfig, ExitCodeRule};
use vcheck_config::{logs, semver, Config, Logs};
use vcheck_protocol::Stage;

pub mod cli;

/// Configuration of the command check.
///
/// ```rhai
/// fn on_config(config) {
///     config.api_version = "^0.1";
///     config.run_on = "rcpt";
///     config.command = ["/usr/local/bin/rcpt-policy", "-a", "{address}"];
///     config.codes = [#{ code: 3, action: "quarantine", message: "spam suspected" }];
///     config.timeout = "10s";
///     config
/// }
/// ```
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandCheckConfig {
    pub api_version: semver::VersionReq,
    /// Stage of the transaction the program runs at.
    #[serde(default)]
    pub run_on: Stage,
    /// Program to run followed by its arguments.
    #[serde(default)]
    pub command: Vec<String>,
    /// Exit code mapping, applied over the defaults.
    #[serde(default)]
    pub codes: Vec<ExitCodeRule>,
    /// Time given to the program, `0s` for no limit.
    #[serde(
        default = "CommandCheckConfig::default_timeout",
        with = "humantime_serde"
    )]
    pub timeout: std::time::Duration,
    /// Log filters of the `vcheck` program.
    #[serde(default)]
    pub logs: Logs,
}

impl CommandCheckConfig {
    const fn default_timeout() -> std::time::Duration {
        CheckConfig::DEFAULT_TIMEOUT
    }
}

impl Default for CommandCheckConfig {
    fn default() -> Self {
        Self {
            api_version: semver::VersionReq::STAR,
            run_on: Stage::default(),
            command: vec![],
            codes: vec![],
            timeout: Self::default_timeout(),
            logs: Logs::default(),
        }
    }
}

impl Config for CommandCheckConfig {
    fn api_version(&self) -> &semver::VersionReq {
        &self.api_version
    }

    fn logs(&self) -> &logs::Logs {
        &self.logs
    }
}
