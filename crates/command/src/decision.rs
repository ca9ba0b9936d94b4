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

use crate::SmtpError;
use vcheck_mail_parser::Headers;
use vcheck_protocol::Reply;

/// Result of a stage event handed to the check.
#[derive(Debug, Default, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    /// The check did not run at this stage, the transaction proceeds.
    #[default]
    Skip,
    /// The transaction proceeds, with the headers produced by the program.
    Accept {
        headers: Headers,
        /// Policy rejection turned into an acceptance by the action table.
        reason: Option<SmtpError>,
    },
    /// The transaction must be refused.
    Reject { error: SmtpError, headers: Headers },
    /// The message is accepted but must be quarantined.
    Quarantine { error: SmtpError, headers: Headers },
}

impl Decision {
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Headers to add to the message, empty for a skipped check.
    #[must_use]
    pub fn headers(&self) -> &[vcheck_mail_parser::Header] {
        match self {
            Self::Skip => &[],
            Self::Accept { headers, .. }
            | Self::Reject { headers, .. }
            | Self::Quarantine { headers, .. } => headers.as_slice(),
        }
    }

    /// Error carried by a rejection or a quarantine.
    #[must_use]
    pub const fn error(&self) -> Option<&SmtpError> {
        match self {
            Self::Reject { error, .. } | Self::Quarantine { error, .. } => Some(error),
            Self::Skip | Self::Accept { .. } => None,
        }
    }

    /// Reply to send to the client instead of the default one, if any.
    #[must_use]
    pub fn reply(&self) -> Option<&Reply> {
        self.error().map(|error| &error.reply)
    }

    /// Is the decision a temporary failure of the check.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.error().is_some_and(SmtpError::is_temporary)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reply() {
            Some(reply) => write!(f, "{} ({reply})", self.as_ref()),
            None => f.write_str(self.as_ref()),
        }
    }
}
