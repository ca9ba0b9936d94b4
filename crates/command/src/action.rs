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

use crate::{error::POLICY_CODE, CheckError, Decision, SmtpError};
use vcheck_mail_parser::Headers;
use vcheck_protocol::{Reply, ReplyCode};

/// What to do with a transaction when the program exits with a given code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Let the transaction go on.
    #[serde(alias = "ignore")]
    Accept,
    /// Refuse the transaction.
    Reject,
    /// Accept the transaction, but put the message in quarantine.
    Quarantine,
}

/// Parts of the default reply replaced by an action.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplyOverride {
    pub code: Option<u16>,
    pub enhanced_code: Option<String>,
    pub message: Option<String>,
}

impl ReplyOverride {
    /// Replace the parts of `reply` set in this override.
    ///
    /// When only the code is replaced, the class of the enhanced code
    /// follows the new code (`450` turns `5.7.1` into `4.7.1`).
    #[must_use]
    pub fn apply(&self, reply: Reply) -> Reply {
        let code = self.code.unwrap_or_else(|| reply.code().value());
        let enhanced = match (&self.enhanced_code, reply.code().details()) {
            (Some(enhanced), _) => Some(enhanced.clone()),
            (None, Some(previous)) if self.code.is_some() => Some(
                previous
                    .split_once('.')
                    .map_or_else(|| previous.to_string(), |(_, rest)| format!("{}.{rest}", code / 100)),
            ),
            (None, previous) => previous.map(str::to_string),
        };

        let reply = reply.with_code(match enhanced {
            Some(enhanced) => ReplyCode::Enhanced { code, enhanced },
            None => ReplyCode::Code { code },
        });

        match &self.message {
            Some(message) => reply.with_text(message),
            None => reply,
        }
    }

    fn validate(&self, exit_code: i32) -> Result<(), CheckError> {
        let invalid = |message: String| CheckError::InvalidReply {
            code: exit_code,
            message,
        };

        // The default policy reply is kept when no code is set.
        let code = self.code.unwrap_or(POLICY_CODE);
        if !(400..600).contains(&code) {
            return Err(invalid(format!("`{code}` is not a 4xx or 5xx reply code")));
        }

        if let Some(enhanced) = &self.enhanced_code {
            let Some(class) = ReplyCode::enhanced_class(enhanced) else {
                return Err(invalid(format!(
                    "`{enhanced}` is not an enhanced status code"
                )));
            };
            if class != code / 100 {
                return Err(invalid(format!(
                    "enhanced code `{enhanced}` does not match the reply code `{code}`"
                )));
            }
        }

        Ok(())
    }
}

/// Configured response to a mapped, nonzero exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAction {
    Accept(ReplyOverride),
    Reject(ReplyOverride),
    Quarantine(ReplyOverride),
}

impl PolicyAction {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Accept(_) => ActionKind::Accept,
            Self::Reject(_) => ActionKind::Reject,
            Self::Quarantine(_) => ActionKind::Quarantine,
        }
    }

    #[must_use]
    pub const fn reply_override(&self) -> &ReplyOverride {
        match self {
            Self::Accept(reply) | Self::Reject(reply) | Self::Quarantine(reply) => reply,
        }
    }

    /// Turn the default policy rejection into this action's decision.
    #[must_use]
    pub fn apply(&self, mut error: SmtpError, headers: Headers) -> Decision {
        error.reply = self.reply_override().apply(error.reply);

        match self {
            Self::Accept(_) => Decision::Accept {
                headers,
                reason: Some(error),
            },
            Self::Reject(_) => Decision::Reject { error, headers },
            Self::Quarantine(_) => Decision::Quarantine { error, headers },
        }
    }
}

/// Entry of the `codes` list in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExitCodeRule {
    /// Exit code of the program.
    pub code: i32,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TryFrom<&ExitCodeRule> for (i32, PolicyAction) {
    type Error = CheckError;

    fn try_from(rule: &ExitCodeRule) -> Result<Self, Self::Error> {
        if rule.code == 0 {
            return Err(CheckError::ZeroExitCode);
        }

        let reply = ReplyOverride {
            code: rule.reply_code,
            enhanced_code: rule.enhanced_code.clone(),
            message: rule.message.clone(),
        };
        reply.validate(rule.code)?;

        Ok((
            rule.code,
            match rule.action {
                ActionKind::Accept => PolicyAction::Accept(reply),
                ActionKind::Reject => PolicyAction::Reject(reply),
                ActionKind::Quarantine => PolicyAction::Quarantine(reply),
            },
        ))
    }
}

/// Exit code to action mapping, written once at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable(std::collections::BTreeMap<i32, PolicyAction>);

impl Default for ActionTable {
    fn default() -> Self {
        Self(std::collections::BTreeMap::from([
            (1, PolicyAction::Reject(ReplyOverride::default())),
            (2, PolicyAction::Quarantine(ReplyOverride::default())),
        ]))
    }
}

impl ActionTable {
    /// Table without the default entries.
    #[must_use]
    pub const fn empty() -> Self {
        Self(std::collections::BTreeMap::new())
    }

    /// Action mapped to `code`, if any.
    #[must_use]
    pub fn get(&self, code: i32) -> Option<&PolicyAction> {
        self.0.get(&code)
    }

    /// Map `code` to `action`, replacing and returning any previous action.
    ///
    /// # Errors
    ///
    /// * `code` is 0, which always means the check passed.
    pub fn insert(
        &mut self,
        code: i32,
        action: PolicyAction,
    ) -> Result<Option<PolicyAction>, CheckError> {
        if code == 0 {
            return Err(CheckError::ZeroExitCode);
        }
        Ok(self.0.insert(code, action))
    }

    /// Apply the configured rules on top of the current table, in order.
    ///
    /// # Errors
    ///
    /// * a rule maps the exit code 0
    /// * a rule has an invalid reply
    pub fn extend_from_rules<'a>(
        &mut self,
        rules: impl IntoIterator<Item = &'a ExitCodeRule>,
    ) -> Result<(), CheckError> {
        for rule in rules {
            let (code, action) = <(i32, PolicyAction)>::try_from(rule)?;
            self.insert(code, action)?;
        }
        Ok(())
    }
}
