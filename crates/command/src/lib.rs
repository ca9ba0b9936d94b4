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

//! Policy check running an external program at one stage of an SMTP transaction.
//!
//! The program receives the transaction context through its arguments
//! (see [`Placeholder`]), and the message through its standard input when run
//! on the body. It answers with its exit code, mapped to an accept / reject /
//! quarantine [`Decision`] by an [`ActionTable`], and may contribute headers
//! by writing a header block at the start of its standard output.

/// Exit code to policy action mapping.
mod action;
/// Shared, immutable check configuration.
mod check;
/// Maps the termination of the program to a decision.
mod classifier;
/// Configuration file of the check.
pub mod config;
/// Outcome of a check, handed to the caller.
mod decision;
/// Errors produced by the check.
mod error;
/// Command line templating.
mod placeholder;
/// Spawning and watching the external program.
mod runner;
/// Per transaction state machine.
mod state;
/// Context collected along the transaction.
mod transaction;

pub use action::{ActionKind, ActionTable, ExitCodeRule, PolicyAction, ReplyOverride};
pub use check::{CheckConfig, CommandCheck, CommandTemplate, CHECK_NAME};
pub use classifier::classify;
pub use decision::Decision;
pub use error::{CheckError, SmtpError};
pub use placeholder::{expand, Placeholder};
pub use runner::{run, CommandLine, ProcessOutput, RunError};
pub use state::{CheckState, Phase};
pub use transaction::{ConnectionInfo, TransactionState};

pub use vcheck_mail_parser::{Body, FileBody, Header, Headers, MemoryBody};
pub use vcheck_protocol::{Reply, ReplyCode, Stage};
