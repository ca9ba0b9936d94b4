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

//! Loading of a check configuration from a `rhai` script.
//!
//! The script defines `on_config(config)`, which receives the default
//! configuration as an object map and returns it modified:
//!
//! ```rhai
//! fn on_config(config) {
//!     config.run_on = "rcpt";
//!     config
//! }
//! ```

pub mod error;
pub mod logs;

pub use error::ConfigError;
pub use logs::Logs;
pub use semver;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, error::ConfigError>;

/// Name of the function the configuration script must define.
pub const ON_CONFIG: &str = "on_config";

/// Configuration of a check, filled by an `on_config` script.
///
/// [`Default`] provides the values the script starts from.
pub trait Config: serde::Serialize + serde::de::DeserializeOwned + Default {
    /// Versions of the program the configuration was written for.
    fn api_version(&self) -> &semver::VersionReq;

    /// Log filters of the program.
    fn logs(&self) -> &logs::Logs;

    /// Load the configuration from the script at `path`.
    ///
    /// Modules imported by the script are looked up next to it.
    fn from_rhai_file(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        let script = std::fs::read_to_string(path)
            .map_err(|error| error::ConfigError::FileOpen(path.into(), error))?;

        Self::from_rhai_script(script, path.parent())
    }

    /// Load the configuration from `script`, importing modules from
    /// `resolve_path` when set.
    fn from_rhai_script(
        script: impl AsRef<str>,
        resolve_path: Option<&std::path::Path>,
    ) -> ConfigResult<Self> {
        let engine = engine(resolve_path);
        let ast = engine.compile(script.as_ref())?;

        let defaults = engine.parse_json(serde_json::to_string(&Self::default())?, true)?;
        let config = engine.call_fn::<rhai::Dynamic>(
            &mut rhai::Scope::new(),
            &ast,
            ON_CONFIG,
            (defaults,),
        )?;

        let Some(config) = config.try_cast::<rhai::Map>() else {
            return Err(error::ConfigError::NotAnObject);
        };

        let config = serde_json::to_string(&config)?;
        let mut config = serde_json::Deserializer::from_str(&config);
        Ok(serde_path_to_error::deserialize(&mut config)?)
    }

    /// Make sure the configuration was written for `version` of the program.
    fn ensure_api_version(&self, version: &semver::Version) -> ConfigResult<()> {
        if self.api_version().matches(version) {
            Ok(())
        } else {
            Err(error::ConfigError::ApiVersion {
                required: self.api_version().clone(),
                got: version.clone(),
            })
        }
    }
}

/// Engine running configuration scripts, `print` and `debug` going to the logs.
fn engine(resolve_path: Option<&std::path::Path>) -> rhai::Engine {
    let mut engine = rhai::Engine::new();

    engine
        .disable_symbol("eval")
        .on_print(|text| tracing::info!("{text}"))
        .on_debug(|text, source, position| tracing::debug!(?source, ?position, "{text}"));

    if let Some(resolve_path) = resolve_path {
        engine.set_module_resolver(
            rhai::module_resolvers::FileModuleResolver::new_with_path_and_extension(
                resolve_path,
                "rhai",
            ),
        );
    }

    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Dummy {
        api_version: semver::VersionReq,
        name: String,
        #[serde(default)]
        logs: Logs,
    }

    impl Default for Dummy {
        fn default() -> Self {
            Self {
                api_version: semver::VersionReq::STAR,
                name: "default".to_string(),
                logs: Logs::default(),
            }
        }
    }

    impl Config for Dummy {
        fn api_version(&self) -> &semver::VersionReq {
            &self.api_version
        }

        fn logs(&self) -> &logs::Logs {
            &self.logs
        }
    }

    #[test]
    fn defaults_are_passed_to_the_script() {
        let config = Dummy::from_rhai_script(
            r#"fn on_config(config) { config.name += "-changed"; config }"#,
            None,
        )
        .unwrap();
        pretty_assertions::assert_eq!(config.name, "default-changed");
    }

    #[test]
    fn print_is_allowed() {
        let config =
            Dummy::from_rhai_script(r#"fn on_config(config) { print("loading"); config }"#, None)
                .unwrap();
        pretty_assertions::assert_eq!(config.name, "default");
    }

    #[test]
    fn eval_is_disabled() {
        assert!(matches!(
            Dummy::from_rhai_script(r#"fn on_config(config) { eval("config") }"#, None),
            Err(ConfigError::Compilation(_))
        ));
    }

    #[test]
    fn not_an_object() {
        assert!(matches!(
            Dummy::from_rhai_script("fn on_config(config) { 42 }", None),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn missing_on_config() {
        assert!(matches!(
            Dummy::from_rhai_script("fn configure(config) { config }", None),
            Err(ConfigError::Execution(_))
        ));
    }

    #[test]
    fn api_version() {
        let config = Dummy::from_rhai_script(
            r#"fn on_config(config) { config.api_version = ">=0.1, <0.2"; config }"#,
            None,
        )
        .unwrap();

        config
            .ensure_api_version(&semver::Version::new(0, 1, 3))
            .unwrap();
        pretty_assertions::assert_eq!(
            config
                .ensure_api_version(&semver::Version::new(0, 2, 0))
                .unwrap_err()
                .to_string(),
            "api version `0.2.0` does not match the requirement `>=0.1, <0.2`"
        );
    }
}
