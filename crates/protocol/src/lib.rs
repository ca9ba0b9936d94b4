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

//! SMTP vocabulary shared by the policy checks: transaction stages and replies.

mod stage;
pub use stage::Stage;

mod types {
    pub mod reply;
    pub mod reply_code;
}

pub use types::{reply::Reply, reply_code::ReplyCode};
