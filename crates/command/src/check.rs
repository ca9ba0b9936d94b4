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

use crate::{
    config::CommandCheckConfig, ActionTable, CheckError, CheckState, ExitCodeRule, PolicyAction,
    TransactionState,
};
use vcheck_protocol::Stage;

/// Name of the check, reported in the errors it produces.
pub const CHECK_NAME: &str = "command";

/// Program to run and its arguments, which may contain placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Configuration of the check, shared by every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    stage: Stage,
    template: CommandTemplate,
    actions: ActionTable,
    timeout: std::time::Duration,
}

impl CheckConfig {
    /// Time given to the program to write its headers and terminate.
    pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

    /// Run `command` at `stage`, with the default exit code mapping.
    ///
    /// The first element of `command` is the program, the others its arguments.
    ///
    /// # Errors
    ///
    /// * `command` is empty
    /// * the program is not an executable file, or cannot be found in `PATH`
    pub fn new(stage: Stage, command: &[String]) -> Result<Self, CheckError> {
        let (program, args) = command.split_first().ok_or(CheckError::MissingCommand)?;

        let resolved = lookup(program).map_err(|source| CheckError::CommandNotUsable {
            command: program.clone(),
            source,
        })?;
        tracing::trace!(%program, resolved = %resolved.display(), "Program found.");

        Ok(Self {
            stage,
            template: CommandTemplate::new(program.clone(), args.to_vec()),
            actions: ActionTable::default(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Build the check described by the configuration file.
    ///
    /// # Errors
    ///
    /// * see [`CheckConfig::new`]
    /// * see [`CheckConfig::with_rules`]
    pub fn from_config(config: &CommandCheckConfig) -> Result<Self, CheckError> {
        Ok(Self::new(config.run_on, &config.command)?
            .with_rules(&config.codes)?
            .with_timeout(config.timeout))
    }

    /// Override the mapping with `rules`, later rules winning.
    ///
    /// # Errors
    ///
    /// * a rule maps the exit code 0
    /// * a rule has an invalid reply
    pub fn with_rules(mut self, rules: &[ExitCodeRule]) -> Result<Self, CheckError> {
        self.actions.extend_from_rules(rules)?;
        Ok(self)
    }

    /// Map `code` to `action`.
    ///
    /// # Errors
    ///
    /// * `code` is 0
    pub fn with_action(mut self, code: i32, action: PolicyAction) -> Result<Self, CheckError> {
        self.actions.insert(code, action)?;
        Ok(self)
    }

    /// Time given to the program for each run. A zero `timeout`, or one
    /// too large to be represented, means no limit.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn template(&self) -> &CommandTemplate {
        &self.template
    }

    #[must_use]
    pub const fn actions(&self) -> &ActionTable {
        &self.actions
    }

    #[must_use]
    pub const fn timeout(&self) -> std::time::Duration {
        self.timeout
    }
}

fn is_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    if metadata.is_file() && metadata.permissions().mode() & 0o111 != 0 {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "not an executable file",
        ))
    }
}

/// Locate the program like the shell would: names with a slash are used
/// as is, the others are searched in the directories of `PATH`.
fn lookup(program: &str) -> std::io::Result<std::path::PathBuf> {
    if program.contains('/') {
        let path = std::path::PathBuf::from(program);
        return is_executable(&path).map(|()| path);
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate).is_ok())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "executable file not found in $PATH",
            )
        })
}

/// Policy check running an external program, shared by every transaction.
#[derive(Debug, Clone)]
pub struct CommandCheck(std::sync::Arc<CheckConfig>);

impl CommandCheck {
    #[must_use]
    pub fn new(config: CheckConfig) -> Self {
        Self(std::sync::Arc::new(config))
    }

    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.0
    }

    /// Create the state of the check for a new transaction.
    #[must_use]
    pub fn state_for_msg(&self, transaction: TransactionState) -> CheckState {
        CheckState::new(self.0.clone(), transaction)
    }
}
