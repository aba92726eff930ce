//! Runtime settings. Values come from built-in defaults, then an optional
//! `bill_engine.toml` (or the file passed on the command line), then
//! `BILL_ENGINE__*` environment variables such as
//! `BILL_ENGINE__LIMITS__MAX_PARTICIPANTS=3`.
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::domain::Error;

const DEFAULT_FILE: &str = "bill_engine";

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: String,
}

/// Plan limits. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Limits {
    pub max_bills: Option<usize>,
    pub max_participants: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub log: Log,
    #[serde(default)]
    pub limits: Limits,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, Error> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("log.level", "info")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("BILL_ENGINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::Builder;

    use super::*;

    #[test]
    fn reads_limits_from_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[log]\nlevel = \"debug\"\n\n[limits]\nmax_participants = 3"
        )
        .unwrap();

        let settings = Settings::new(Some(file.path())).unwrap();

        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.limits.max_participants, Some(3));
        assert_eq!(settings.limits.max_bills, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::new(Some(Path::new("/nonexistent/bill_engine.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
