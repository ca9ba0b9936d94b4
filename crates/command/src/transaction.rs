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

/// Metadata of the connection the transaction belongs to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Identity of the authenticated client.
    pub auth_user: Option<String>,
    /// Address of the client, absent for non IP transports.
    pub remote_addr: Option<std::net::SocketAddr>,
    /// Name announced by the client in HELO / EHLO.
    pub hostname: Option<String>,
    /// Name obtained by a reverse DNS lookup of the client address.
    pub rdns_name: Option<String>,
}

/// Context accumulated along a single mail transaction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionState {
    pub conn: Option<ConnectionInfo>,
    pub msg_id: String,
    pub mail_from: Option<String>,
    rcpts: Vec<String>,
}

impl TransactionState {
    #[must_use]
    pub fn new(msg_id: impl Into<String>) -> Self {
        Self {
            msg_id: msg_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_connection(mut self, conn: ConnectionInfo) -> Self {
        self.conn = Some(conn);
        self
    }

    /// Recipients recorded so far, in the order they were received.
    #[must_use]
    pub fn rcpts(&self) -> &[String] {
        &self.rcpts
    }

    /// Record a new recipient. Recorded recipients are never modified.
    pub fn push_rcpt(&mut self, address: impl Into<String>) {
        self.rcpts.push(address.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcpts_grow() {
        let mut state = TransactionState::new("msg-1");
        assert!(state.rcpts().is_empty());

        state.push_rcpt("a@x.test");
        state.push_rcpt("b@x.test");
        pretty_assertions::assert_eq!(state.rcpts(), &["a@x.test", "b@x.test"]);
        pretty_assertions::assert_eq!(state.msg_id, "msg-1");
    }
}
