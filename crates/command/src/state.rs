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

use crate::{classify, expand, run, CheckConfig, Decision, SmtpError, TransactionState};
use vcheck_mail_parser::{write_header_block, Body, Headers};
use vcheck_protocol::Stage;

/// Position of the transaction relative to the stage the check runs at.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// The configured stage has not been reached yet.
    #[default]
    Idle,
    /// The program ran at the configured stage.
    Triggered,
    /// The configured stage is over.
    PassThrough,
}

/// State of the check for a single transaction.
///
/// Events must be handed in the order of the transaction, each returning
/// [`Decision::Skip`] unless the check is configured to run at its stage.
#[derive(Debug)]
pub struct CheckState {
    config: std::sync::Arc<CheckConfig>,
    transaction: TransactionState,
    phase: Phase,
}

impl CheckState {
    pub(crate) fn new(config: std::sync::Arc<CheckConfig>, transaction: TransactionState) -> Self {
        Self {
            config,
            transaction,
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub const fn transaction(&self) -> &TransactionState {
        &self.transaction
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The client connected.
    pub fn check_connection(&mut self) -> Decision {
        if !self.enter(Stage::Connect) {
            return Decision::Skip;
        }
        self.invoke(None, Box::new(std::io::empty()))
    }

    /// The client sent MAIL FROM.
    pub fn check_sender(&mut self, address: &str) -> Decision {
        self.transaction.mail_from = Some(address.to_string());

        if !self.enter(Stage::MailFrom) {
            return Decision::Skip;
        }
        self.invoke(Some(address), Box::new(std::io::empty()))
    }

    /// The client sent RCPT TO. The recipient is recorded before the program
    /// runs, so `{rcpts}` contains it.
    pub fn check_rcpt(&mut self, address: &str) -> Decision {
        self.transaction.push_rcpt(address);

        if !self.enter(Stage::RcptTo) {
            return Decision::Skip;
        }
        self.invoke(Some(address), Box::new(std::io::empty()))
    }

    /// The message has been received. The program reads the header block
    /// followed by the body on its standard input.
    pub fn check_body(&mut self, headers: &Headers, body: &dyn Body) -> Decision {
        if !self.enter(Stage::Body) {
            return Decision::Skip;
        }

        let mut input = Vec::new();
        let opened = write_header_block(&mut input, headers).and_then(|()| body.open());

        match opened {
            Ok(body) => self.invoke(
                None,
                Box::new(std::io::Read::chain(std::io::Cursor::new(input), body)),
            ),
            Err(error) => {
                let command_line = expand(self.config.template(), &self.transaction, None);
                tracing::warn!(
                    command = %command_line,
                    %error,
                    "Failed to open the message body."
                );

                Decision::Reject {
                    error: SmtpError::internal(command_line.to_string(), error).with_reason("body"),
                    headers: Headers::default(),
                }
            }
        }
    }

    /// End of the transaction. The check holds no resources.
    pub fn close(self) {
        tracing::trace!(msg_id = %self.transaction.msg_id, phase = %self.phase, "Check closed.");
    }

    /// Update the phase for an event at `stage`, returning whether the
    /// program must run.
    fn enter(&mut self, stage: Stage) -> bool {
        let expected = self.config.stage();

        self.phase = match stage.cmp(&expected) {
            std::cmp::Ordering::Less => Phase::Idle,
            std::cmp::Ordering::Equal => Phase::Triggered,
            std::cmp::Ordering::Greater => Phase::PassThrough,
        };

        if self.phase != Phase::Triggered {
            tracing::debug!(%stage, %expected, "Not running the command at this stage.");
        }
        self.phase == Phase::Triggered
    }

    fn invoke(&self, address: Option<&str>, input: Box<dyn std::io::Read + Send>) -> Decision {
        let command_line = expand(self.config.template(), &self.transaction, address);
        let outcome = run(&command_line, input, self.config.timeout());
        let decision = classify(self.config.actions(), &command_line, outcome);

        let stage = self.config.stage();
        match &decision {
            Decision::Skip => {}
            Decision::Accept {
                reason: None,
                headers,
            } => {
                tracing::debug!(
                    %stage,
                    command = %command_line,
                    headers = headers.len(),
                    "Check passed."
                );
            }
            Decision::Accept {
                reason: Some(reason),
                ..
            } => {
                tracing::info!(
                    %stage,
                    command = %command_line,
                    exit_code = reason.exit_code,
                    "Check passed by the exit code mapping."
                );
            }
            Decision::Reject { error, .. } if error.is_internal() => {
                tracing::warn!(
                    %stage,
                    command = %command_line,
                    exit_code = error.exit_code,
                    reason = error.reason.as_deref(),
                    cause = error.cause.as_deref(),
                    "Check failed."
                );
            }
            Decision::Reject { error, .. } | Decision::Quarantine { error, .. } => {
                tracing::info!(
                    %stage,
                    command = %command_line,
                    exit_code = error.exit_code,
                    decision = decision.as_ref(),
                    reply = %error.reply,
                    "Check refused the transaction."
                );
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandCheck;

    fn check(stage: Stage, script: &str) -> CommandCheck {
        CommandCheck::new(
            CheckConfig::new(
                stage,
                &["/bin/sh".to_string(), "-c".to_string(), script.to_string()],
            )
            .unwrap(),
        )
    }

    #[rstest::rstest]
    #[case(Stage::Connect, [Phase::Triggered, Phase::PassThrough, Phase::PassThrough, Phase::PassThrough])]
    #[case(Stage::MailFrom, [Phase::Idle, Phase::Triggered, Phase::PassThrough, Phase::PassThrough])]
    #[case(Stage::RcptTo, [Phase::Idle, Phase::Idle, Phase::Triggered, Phase::PassThrough])]
    #[case(Stage::Body, [Phase::Idle, Phase::Idle, Phase::Idle, Phase::Triggered])]
    fn phases(#[case] stage: Stage, #[case] expected: [Phase; 4]) {
        let mut state = check(stage, "exit 0").state_for_msg(TransactionState::new("msg"));
        assert_eq!(state.phase(), Phase::Idle);

        let mut phases = vec![];
        state.check_connection();
        phases.push(state.phase());
        state.check_sender("a@x.test");
        phases.push(state.phase());
        state.check_rcpt("b@x.test");
        phases.push(state.phase());
        state.check_body(&Headers::default(), &crate::MemoryBody::new(""));
        phases.push(state.phase());

        pretty_assertions::assert_eq!(phases, expected);
        state.close();
    }

    #[test]
    fn context_recorded_regardless_of_stage() {
        let mut state = check(Stage::Connect, "exit 0").state_for_msg(TransactionState::new("msg"));
        assert!(state.check_sender("s@x.test").is_skip());
        assert!(state.check_rcpt("a@x.test").is_skip());
        assert!(state.check_rcpt("b@x.test").is_skip());

        pretty_assertions::assert_eq!(state.transaction().mail_from.as_deref(), Some("s@x.test"));
        pretty_assertions::assert_eq!(state.transaction().rcpts(), &["a@x.test", "b@x.test"]);
    }
}
