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

use crate::{CommandLine, CommandTemplate, TransactionState};

/// Token of a command argument replaced by a value of the transaction.
///
/// Tokens are written `{name}` in the arguments, for example `{sender}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Placeholder {
    /// Identity of the authenticated client.
    AuthUser,
    /// IP address of the client.
    SourceIp,
    /// Name announced by the client in HELO / EHLO.
    SourceHost,
    /// Reverse DNS name of the client address.
    SourceRdns,
    /// Identifier of the message.
    MsgId,
    /// Address of the MAIL FROM command.
    Sender,
    /// Recipients received so far, one per line.
    Rcpts,
    /// Address of the event being checked.
    Address,
}

impl Placeholder {
    /// Value of the token for this transaction, empty when unknown.
    #[must_use]
    pub fn resolve(self, state: &TransactionState, address: Option<&str>) -> String {
        let conn = state.conn.as_ref();

        match self {
            Self::AuthUser => conn.and_then(|c| c.auth_user.clone()),
            Self::SourceIp => conn
                .and_then(|c| c.remote_addr)
                .map(|addr| addr.ip().to_string()),
            Self::SourceHost => conn.and_then(|c| c.hostname.clone()),
            Self::SourceRdns => conn.and_then(|c| c.rdns_name.clone()),
            Self::MsgId => Some(state.msg_id.clone()),
            Self::Sender => state.mail_from.clone(),
            Self::Rcpts => Some(state.rcpts().join("\n")),
            Self::Address => address.map(str::to_string),
        }
        .unwrap_or_default()
    }
}

fn token_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"\{([a-zA-Z0-9_]+)\}").expect("placeholder pattern is valid")
    })
}

/// Build the command line to run from the template.
///
/// Every known token of the arguments is replaced by its value, unknown
/// tokens are kept as is. The program name is never templated.
#[must_use]
pub fn expand(
    template: &CommandTemplate,
    state: &TransactionState,
    address: Option<&str>,
) -> CommandLine {
    let args = template
        .args()
        .iter()
        .map(|arg| {
            token_pattern()
                .replace_all(arg, |captures: &regex::Captures<'_>| {
                    captures[1].parse::<Placeholder>().map_or_else(
                        |_| captures[0].to_string(),
                        |placeholder| placeholder.resolve(state, address),
                    )
                })
                .into_owned()
        })
        .collect();

    CommandLine::new(template.program(), args)
}
