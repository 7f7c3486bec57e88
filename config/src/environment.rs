use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable selecting the configuration overlay.
const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

/// Runtime environment, used to pick the `configuration/{environment}.*` overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

/// `APP_ENVIRONMENT` named an environment other than `dev` or `prod`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported environment `{0}`, expected `dev` or `prod`")]
pub struct UnknownEnvironment(pub String);

impl Environment {
    const ALL: [Environment; 2] = [Environment::Dev, Environment::Prod];

    /// Reads the environment from `APP_ENVIRONMENT`.
    ///
    /// An unset or non-unicode variable selects [`Environment::Dev`].
    pub fn load() -> Result<Environment, UnknownEnvironment> {
        Self::from_var(std::env::var(APP_ENVIRONMENT_ENV_NAME).ok().as_deref())
    }

    fn from_var(value: Option<&str>) -> Result<Environment, UnknownEnvironment> {
        value.map_or(Ok(Environment::default()), str::parse)
    }

    /// File stem of this environment's configuration overlay.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Self::ALL
            .into_iter()
            .find(|environment| environment.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownEnvironment(name.to_owned()))
    }
}
