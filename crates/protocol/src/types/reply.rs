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

use crate::ReplyCode;

/// A single line SMTP reply: a code and a human readable text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reply {
    code: ReplyCode,
    text: String,
}

impl Reply {
    /// Create a new reply. Line breaks in `text` are replaced by spaces.
    #[must_use]
    pub fn new(code: ReplyCode, text: impl AsRef<str>) -> Self {
        Self {
            code,
            text: text.as_ref().replace(['\r', '\n'], " ").trim().to_string(),
        }
    }

    /// Code of the reply.
    #[must_use]
    pub const fn code(&self) -> &ReplyCode {
        &self.code
    }

    /// Replace the code, keeping the text.
    #[must_use]
    pub fn with_code(self, code: ReplyCode) -> Self {
        Self { code, ..self }
    }

    /// Replace the text, keeping the code.
    #[must_use]
    pub fn with_text(self, text: impl AsRef<str>) -> Self {
        Self::new(self.code, text)
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.text)
        }
    }
}
