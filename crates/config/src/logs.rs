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

use std::collections::HashMap;
use tracing_subscriber::filter::LevelFilter;

#[serde_with::serde_as]
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Logs {
    /// Level used for every target not listed in `levels`.
    #[serde(default = "Logs::default_level")]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub default_level: LevelFilter,
    /// Customize the log level of the different part of the program.
    ///
    /// See <https://docs.rs/tracing-subscriber/0.3.15/tracing_subscriber/filter/struct.Targets.html>
    #[serde(default)]
    #[serde_as(as = "HashMap<_, serde_with::DisplayFromStr>")]
    pub levels: HashMap<String, LevelFilter>,
}

impl Logs {
    const fn default_level() -> LevelFilter {
        LevelFilter::WARN
    }

    /// Build the filter to install on the subscriber's layers.
    #[must_use]
    pub fn targets(&self) -> tracing_subscriber::filter::Targets {
        tracing_subscriber::filter::Targets::new()
            .with_targets(self.levels.clone())
            .with_default(self.default_level)
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self {
            default_level: Self::default_level(),
            levels: HashMap::default(),
        }
    }
}
