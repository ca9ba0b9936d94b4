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

use crate::check::CHECK_NAME;
use vcheck_protocol::{Reply, ReplyCode};

/// Reply code of the default policy rejection.
pub(crate) const POLICY_CODE: u16 = 550;

/// Error reported to the SMTP client, along with the details the operator
/// needs to understand it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reply}")]
pub struct SmtpError {
    /// Reply sent to the client.
    pub reply: Reply,
    /// Name of the check that produced the error.
    pub check_name: &'static str,
    /// Short tag describing the error, for the logs.
    pub reason: Option<String>,
    /// Description of the underlying failure, if any.
    pub cause: Option<String>,
    /// Command line of the program, as it was run.
    pub command_line: String,
    /// Exit code of the program, when it exited normally.
    pub exit_code: Option<i32>,
}

impl SmtpError {
    /// Transient failure of the check itself, the client should retry later.
    #[must_use]
    pub fn internal(command_line: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self {
            reply: Reply::new(ReplyCode::enhanced(450, "4.0.0"), "Internal server error"),
            check_name: CHECK_NAME,
            reason: None,
            cause: Some(cause.to_string()),
            command_line: command_line.into(),
            exit_code: None,
        }
    }

    /// Permanent rejection decided by the program.
    #[must_use]
    pub fn policy(command_line: impl Into<String>, exit_code: i32) -> Self {
        Self {
            reply: Reply::new(
                ReplyCode::enhanced(POLICY_CODE, "5.7.1"),
                "Message rejected due to local policy",
            ),
            check_name: CHECK_NAME,
            reason: None,
            cause: None,
            command_line: command_line.into(),
            exit_code: Some(exit_code),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub const fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    /// Did the check itself fail, as opposed to the program refusing the
    /// transaction with a temporary reply.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.cause.is_some()
    }

    /// Should the client try again later.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.reply.code().is_temporary()
    }
}

/// Errors raised when building a check from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("at least one argument is required (command name)")]
    MissingCommand,
    #[error("command `{command}` is not usable: {source}")]
    CommandNotUsable {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("exit code 0 always means the check passed, it cannot be mapped to an action")]
    ZeroExitCode,
    #[error("invalid reply for exit code {code}: {message}")]
    InvalidReply { code: i32, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        let error = SmtpError::internal("/bin/false", "boom").with_reason("unexpected exit code");
        assert!(error.is_temporary());
        assert!(error.is_internal());
        pretty_assertions::assert_eq!(error.to_string(), "450 4.0.0 Internal server error");
        pretty_assertions::assert_eq!(error.cause.as_deref(), Some("boom"));
        pretty_assertions::assert_eq!(error.check_name, "command");
    }

    #[test]
    fn policy() {
        let error = SmtpError::policy("/bin/false", 1);
        assert!(!error.is_temporary());
        pretty_assertions::assert_eq!(
            error.to_string(),
            "550 5.7.1 Message rejected due to local policy"
        );
        pretty_assertions::assert_eq!(error.exit_code, Some(1));
    }

    #[test]
    fn temporary_policy() {
        let mut error = SmtpError::policy("/bin/false", 3);
        error.reply = crate::ReplyOverride {
            code: Some(450),
            ..Default::default()
        }
        .apply(error.reply);

        assert!(error.is_temporary());
        assert!(!error.is_internal());
        pretty_assertions::assert_eq!(
            error.to_string(),
            "450 4.7.1 Message rejected due to local policy"
        );
    }
}
