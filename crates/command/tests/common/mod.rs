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

#![allow(dead_code)]

use vcheck_command::{CheckConfig, CommandCheck, ExitCodeRule, Stage, TransactionState};

/// Build a complete path from the current cargo manifest files using a relative path.
#[macro_export]
macro_rules! from_manifest_path {
    ($path:expr) => {
        std::path::PathBuf::from_iter([env!("CARGO_MANIFEST_DIR"), $path])
    };
}

/// Empty directory private to a test.
pub fn scratch(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("vcheck-{}-{name}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Check running `script` with `/bin/sh` at `stage`, `args` following the script.
pub fn sh(stage: Stage, script: &str, args: &[&str], rules: &[ExitCodeRule]) -> CommandCheck {
    let command = ["/bin/sh", "-c", script, "check"]
        .into_iter()
        .chain(args.iter().copied())
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    CommandCheck::new(
        CheckConfig::new(stage, &command)
            .unwrap()
            .with_rules(rules)
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(10)),
    )
}

pub fn transaction() -> TransactionState {
    TransactionState::new("1a2b3c")
}
