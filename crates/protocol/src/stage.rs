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

/// Step of the SMTP transaction at which a check can be run.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
pub enum Stage {
    /// The client has just connected to the server
    #[strum(serialize = "conn")]
    Connect,
    /// The client has sent the MAIL FROM command
    #[strum(serialize = "sender")]
    MailFrom,
    /// The client has sent a RCPT TO command
    #[strum(serialize = "rcpt")]
    RcptTo,
    /// The client has sent the complete message
    #[default]
    #[strum(serialize = "body")]
    Body,
}
