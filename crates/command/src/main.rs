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

use vcheck_command::{
    config::{cli::Args, CommandCheckConfig},
    Body, CheckConfig, CommandCheck, ConnectionInfo, Decision, FileBody, Headers, MemoryBody,
    TransactionState,
};
use vcheck_config::{semver, Config};

/// Temporary failure, as in `sysexits.h`.
const EX_TEMPFAIL: u8 = 75;

fn exit_code(decision: &Decision) -> std::process::ExitCode {
    match decision {
        Decision::Skip | Decision::Accept { .. } => std::process::ExitCode::SUCCESS,
        Decision::Reject { error, .. } if error.is_temporary() => EX_TEMPFAIL.into(),
        Decision::Reject { .. } => 1.into(),
        Decision::Quarantine { .. } => 2.into(),
    }
}

/// Split the message file into its header block and its body.
fn load_message(path: &std::path::Path) -> std::io::Result<(Headers, FileBody)> {
    let mut reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let headers = vcheck_mail_parser::read_header_block(&mut reader)
        .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidData, error))?;

    // A file without a header block is all body.
    let offset = if headers.is_empty() {
        0
    } else {
        std::io::Seek::stream_position(&mut reader)?
    };

    Ok((headers, FileBody::new(path).with_offset(offset)))
}

const fn is_final(decision: &Decision) -> bool {
    matches!(decision, Decision::Reject { .. } | Decision::Quarantine { .. })
}

fn record(outcome: &mut Decision, decision: Decision) {
    if !decision.is_skip() {
        *outcome = decision;
    }
}

/// Replay the transaction described by `args`, stopping at the first refusal.
fn replay(check: &CommandCheck, args: &Args) -> Result<Decision, Box<dyn std::error::Error>> {
    let (headers, body) = match &args.message {
        Some(path) => {
            let (headers, body) = load_message(path)?;
            (headers, Box::new(body) as Box<dyn Body>)
        }
        None => (
            Headers::default(),
            Box::new(MemoryBody::new("")) as Box<dyn Body>,
        ),
    };

    let transaction = TransactionState::new(&args.msg_id).with_connection(ConnectionInfo {
        auth_user: args.auth_user.clone(),
        remote_addr: args.source_ip,
        hostname: args.source_host.clone(),
        rdns_name: args.source_rdns.clone(),
    });
    let mut state = check.state_for_msg(transaction);

    let mut outcome = state.check_connection();

    if !is_final(&outcome) {
        // An absent sender is the null reverse path.
        let sender = args.sender.as_deref().unwrap_or_default();
        record(&mut outcome, state.check_sender(sender));
    }

    for rcpt in &args.rcpt {
        if is_final(&outcome) {
            break;
        }
        record(&mut outcome, state.check_rcpt(rcpt));
    }

    if !is_final(&outcome) {
        record(&mut outcome, state.check_body(&headers, body.as_ref()));
    }

    state.close();
    Ok(outcome)
}

fn main() -> std::process::ExitCode {
    use tracing_subscriber::prelude::*;

    let args = <Args as clap::Parser>::parse();

    let run = || -> Result<Decision, Box<dyn std::error::Error>> {
        let config = CommandCheckConfig::from_rhai_file(&args.config)?;
        config.ensure_api_version(&semver::Version::parse(env!("CARGO_PKG_VERSION"))?)?;

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(config.logs().targets()),
            )
            .try_init()?;

        let check = CommandCheck::new(CheckConfig::from_config(&config)?);
        replay(&check, &args)
    };

    match run() {
        Ok(decision) => {
            println!("{decision}");
            for header in decision.headers() {
                println!("{}: {}", header.name, header.unfolded());
            }
            exit_code(&decision)
        }
        Err(error) => {
            eprintln!("vcheck: {error}");
            EX_TEMPFAIL.into()
        }
    }
}
