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

mod common;

use vcheck_command::{Decision, Header, Headers, MemoryBody, Stage};

#[rstest::rstest]
#[case(Stage::Connect, "conn", 1)]
#[case(Stage::MailFrom, "sender", 1)]
#[case(Stage::RcptTo, "rcpt", 2)]
#[case(Stage::Body, "body", 1)]
fn runs_only_at_its_stage(#[case] stage: Stage, #[case] name: &str, #[case] runs: usize) {
    let dir = common::scratch(&format!("stage-{name}"));
    let log = dir.join("runs");

    let check = common::sh(
        stage,
        &format!("echo run >> '{}'", log.display()),
        &[],
        &[],
    );
    let mut state = check.state_for_msg(common::transaction());

    let decisions = [
        (Stage::Connect, state.check_connection()),
        (Stage::MailFrom, state.check_sender("s@x.test")),
        (Stage::RcptTo, state.check_rcpt("a@x.test")),
        (Stage::RcptTo, state.check_rcpt("b@x.test")),
        (
            Stage::Body,
            state.check_body(&Headers::default(), &MemoryBody::new("hello\r\n")),
        ),
    ];
    state.close();

    for (event, decision) in decisions {
        if event == stage {
            assert!(
                matches!(decision, Decision::Accept { reason: None, .. }),
                "{event}: {decision}"
            );
        } else {
            assert!(decision.is_skip(), "{event}: {decision}");
        }
    }

    pretty_assertions::assert_eq!(std::fs::read_to_string(log).unwrap().lines().count(), runs);
}

#[test]
fn rcpt_arguments() {
    let dir = common::scratch("rcpt-arguments");
    let log = dir.join("args");

    let check = common::sh(
        Stage::RcptTo,
        &format!("printf '%s|' \"$@\" >> '{0}'; echo >> '{0}'", log.display()),
        &["-a", "{address}", "{rcpts}", "{unknown}"],
        &[],
    );
    let mut state = check.state_for_msg(common::transaction());

    assert!(state.check_sender("s@x.test").is_skip());
    assert!(!state.check_rcpt("a@x.test").is_skip());
    assert!(!state.check_rcpt("b@x.test").is_skip());

    pretty_assertions::assert_eq!(
        std::fs::read_to_string(log).unwrap(),
        concat!(
            "-a|a@x.test|a@x.test|{unknown}|\n",
            "-a|b@x.test|a@x.test\nb@x.test|{unknown}|\n",
        )
    );
}

#[test]
fn sender_arguments() {
    let dir = common::scratch("sender-arguments");
    let log = dir.join("args");

    let check = common::sh(
        Stage::MailFrom,
        &format!("printf '%s|' \"$@\" > '{}'", log.display()),
        &["{sender}", "{address}", "{rcpts}", "{msg_id}"],
        &[],
    );
    let mut state = check.state_for_msg(common::transaction());

    assert!(state.check_connection().is_skip());
    assert!(!state.check_sender("s@x.test").is_skip());

    pretty_assertions::assert_eq!(
        std::fs::read_to_string(log).unwrap(),
        "s@x.test|s@x.test||1a2b3c|"
    );
}

#[test]
fn body_input_and_headers() {
    let dir = common::scratch("body-input");
    let input = dir.join("input");

    let check = common::sh(
        Stage::Body,
        &format!(
            "cat > '{}'; printf 'X-Checked: yes\\n\\nthis is not a header\\n'",
            input.display()
        ),
        &[],
        &[],
    );
    let mut state = check.state_for_msg(common::transaction());
    state.check_connection();
    state.check_sender("s@x.test");
    state.check_rcpt("a@x.test");

    let decision = state.check_body(
        &Headers::from(vec![Header::new("Subject", "hi"), Header::new("From", "s@x.test")]),
        &MemoryBody::new("hello\r\n"),
    );

    pretty_assertions::assert_eq!(
        decision,
        Decision::Accept {
            headers: Headers::from(vec![Header::new("X-Checked", "yes")]),
            reason: None,
        }
    );
    pretty_assertions::assert_eq!(
        std::fs::read_to_string(input).unwrap(),
        "Subject: hi\r\nFrom: s@x.test\r\n\r\nhello\r\n"
    );
}

#[test]
fn connection_placeholders() {
    let dir = common::scratch("connection-placeholders");
    let log = dir.join("args");

    let check = common::sh(
        Stage::Connect,
        &format!("printf '%s|' \"$@\" > '{}'", log.display()),
        &[
            "{auth_user}",
            "{source_ip}",
            "{source_host}",
            "{source_rdns}",
            "{address}",
        ],
        &[],
    );
    let transaction = common::transaction().with_connection(vcheck_command::ConnectionInfo {
        auth_user: None,
        remote_addr: Some("[2001:db8::1]:25".parse().unwrap()),
        hostname: Some("mx.client.test".to_string()),
        rdns_name: None,
    });

    let decision = check.state_for_msg(transaction).check_connection();
    assert!(matches!(decision, Decision::Accept { .. }));

    pretty_assertions::assert_eq!(
        std::fs::read_to_string(log).unwrap(),
        "|2001:db8::1|mx.client.test|||"
    );
}
