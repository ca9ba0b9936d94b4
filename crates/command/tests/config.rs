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

use vcheck_command::{
    config::CommandCheckConfig, CheckConfig, CheckError, CommandCheck, Decision, Headers,
    MemoryBody,
};
use vcheck_config::Config;

#[test]
fn from_file() {
    let config =
        CommandCheckConfig::from_rhai_file(&from_manifest_path!("tests/fixtures/quarantine.rhai"))
            .unwrap();
    pretty_assertions::assert_eq!(config.timeout, std::time::Duration::from_secs(5));

    let check = CommandCheck::new(CheckConfig::from_config(&config).unwrap());
    let mut state = check.state_for_msg(common::transaction());

    assert!(state.check_connection().is_skip());
    assert!(state.check_sender("s@x.test").is_skip());
    assert!(state.check_rcpt("a@x.test").is_skip());

    let decision = state.check_body(&Headers::default(), &MemoryBody::new("hello\r\n"));
    let Decision::Quarantine { error, .. } = decision else {
        panic!("unexpected decision {decision:?}");
    };
    pretty_assertions::assert_eq!(error.reply.to_string(), "550 5.7.1 spam suspected");
    pretty_assertions::assert_eq!(error.check_name, "command");
}

#[test]
fn zero_cannot_be_mapped() {
    let config =
        CommandCheckConfig::from_rhai_file(&from_manifest_path!("tests/fixtures/zero.rhai"))
            .unwrap();
    assert!(matches!(
        CheckConfig::from_config(&config),
        Err(CheckError::ZeroExitCode)
    ));
}

#[test]
fn missing_program() {
    let config =
        CommandCheckConfig::from_rhai_file(&from_manifest_path!("tests/fixtures/missing.rhai"))
            .unwrap();
    assert!(matches!(
        CheckConfig::from_config(&config),
        Err(CheckError::CommandNotUsable { command, .. }) if command == "/nonexistent/policy-check"
    ));
}

#[test]
fn missing_command() {
    let config = CommandCheckConfig::from_rhai_script(
        r#"fn on_config(config) { config.api_version = "^0.1"; config }"#,
        None,
    )
    .unwrap();
    assert!(matches!(
        CheckConfig::from_config(&config),
        Err(CheckError::MissingCommand)
    ));
}

#[test]
fn missing_file() {
    assert!(CommandCheckConfig::from_rhai_file(&from_manifest_path!("tests/fixtures/none.rhai")).is_err());
}

#[rstest::rstest]
#[case("0s")]
#[case("400000000000years")]
fn unbounded_timeout(#[case] timeout: &str) {
    let config = CommandCheckConfig::from_rhai_script(
        format!(
            r#"
fn on_config(config) {{
    config.run_on = "conn";
    config.command = ["/bin/sh", "-c", "exit 0"];
    config.timeout = "{timeout}";
    config
}}
"#
        ),
        None,
    )
    .unwrap();

    let check = CommandCheck::new(CheckConfig::from_config(&config).unwrap());
    assert!(matches!(
        check.state_for_msg(common::transaction()).check_connection(),
        Decision::Accept { reason: None, .. }
    ));
}
