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

use crate::{ActionTable, CommandLine, Decision, ProcessOutput, RunError, SmtpError};

/// Map the outcome of an invocation to a decision.
///
/// * exit code 0 accepts, whatever the table says
/// * a mapped exit code applies its action to the default policy rejection
/// * a failed invocation, a death by signal or an unmapped exit code is a
///   temporary failure
#[must_use]
pub fn classify(
    table: &ActionTable,
    command_line: &CommandLine,
    outcome: Result<ProcessOutput, RunError>,
) -> Decision {
    let command = command_line.to_string();

    let ProcessOutput { status, headers } = match outcome {
        Ok(output) => output,
        Err(error) => {
            return Decision::Reject {
                error: SmtpError::internal(command, &error).with_reason(error.reason()),
                headers: vcheck_mail_parser::Headers::default(),
            }
        }
    };

    let Some(code) = status.code() else {
        return Decision::Reject {
            error: SmtpError::internal(command, status).with_reason("signal"),
            headers,
        };
    };

    if code == 0 {
        return Decision::Accept {
            headers,
            reason: None,
        };
    }

    match table.get(code) {
        Some(action) => action.apply(SmtpError::policy(command, code), headers),
        None => Decision::Reject {
            error: SmtpError::internal(command, status)
                .with_reason("unexpected exit code")
                .with_exit_code(code),
            headers,
        },
    }
}
