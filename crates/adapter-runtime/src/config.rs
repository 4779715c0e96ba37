//! # Session Configuration
//!
//! A `SettingsBundle` is built by the caller; the connection part can be
//! overridden from the environment before the session opens.
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `HB_HOST` | `connection.host` | IP address |
//! | `HB_PUSH_PORT` | `connection.push_port` | 3000-65000 |
//! | `HB_PULL_PORT` | `connection.pull_port` | 3000-65000 |
//! | `HB_MAX_WAIT_SECS` | `connection.max_wait` | seconds, or `500ms` / `10m` |

use shared_types::{parse_duration, ConfigError, SettingsBundle};
use std::env;
use tracing::info;

pub const ENV_HOST: &str = "HB_HOST";
pub const ENV_PUSH_PORT: &str = "HB_PUSH_PORT";
pub const ENV_PULL_PORT: &str = "HB_PULL_PORT";
pub const ENV_MAX_WAIT: &str = "HB_MAX_WAIT_SECS";

/// Apply environment overrides, then validate.
pub fn load_settings(settings: SettingsBundle) -> Result<SettingsBundle, ConfigError> {
    apply_overrides(settings, |key| env::var(key).ok())
}

/// Apply overrides read through `lookup`, then validate.
pub fn apply_overrides<F>(mut settings: SettingsBundle, lookup: F) -> Result<SettingsBundle, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let connection = &mut settings.connection;

    if let Some(host) = lookup(ENV_HOST) {
        connection.host = host
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{ENV_HOST}: '{host}' is not an IP address")))?;
        info!(host = %connection.host, "Host overridden from environment");
    }
    if let Some(port) = lookup(ENV_PUSH_PORT) {
        connection.push_port = parse_port(ENV_PUSH_PORT, &port)?;
    }
    if let Some(port) = lookup(ENV_PULL_PORT) {
        connection.pull_port = parse_port(ENV_PULL_PORT, &port)?;
    }
    if let Some(wait) = lookup(ENV_MAX_WAIT) {
        connection.max_wait = parse_duration(&wait)
            .map_err(|e| ConfigError::InvalidTimeout(format!("{ENV_MAX_WAIT}: {e}")))?;
    }

    settings.validate()?;
    Ok(settings)
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}: '{value}' is not a port")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let settings = apply_overrides(SettingsBundle::default(), lookup(&[])).unwrap();
        assert_eq!(settings, SettingsBundle::default());
    }

    #[test]
    fn test_overrides_applied() {
        let settings = apply_overrides(
            SettingsBundle::default(),
            lookup(&[
                (ENV_HOST, "10.0.0.5"),
                (ENV_PUSH_PORT, "4000"),
                (ENV_PULL_PORT, "4001"),
                (ENV_MAX_WAIT, "30"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.connection.host.to_string(), "10.0.0.5");
        assert_eq!(settings.connection.push_port, 4000);
        assert_eq!(settings.connection.pull_port, 4001);
        assert_eq!(settings.connection.max_wait, Duration::from_secs(30));
    }

    #[test]
    fn test_bad_values_rejected() {
        let result = apply_overrides(SettingsBundle::default(), lookup(&[(ENV_PUSH_PORT, "http")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = apply_overrides(SettingsBundle::default(), lookup(&[(ENV_MAX_WAIT, "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));

        let result = apply_overrides(
            SettingsBundle::default(),
            lookup(&[(ENV_MAX_WAIT, "307445734561825861m")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn test_overrides_are_validated() {
        let result = apply_overrides(
            SettingsBundle::default(),
            lookup(&[(ENV_PUSH_PORT, "5000"), (ENV_PULL_PORT, "5000")]),
        );
        assert_eq!(result, Err(ConfigError::DuplicatePorts));

        let result = apply_overrides(SettingsBundle::default(), lookup(&[(ENV_PULL_PORT, "80")]));
        assert_eq!(result, Err(ConfigError::PortOutOfRange { port: 80 }));
    }
}
