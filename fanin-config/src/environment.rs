use std::fmt;
use std::io;
use std::str::FromStr;

/// Environment variable that selects the runtime environment.
pub const ENVIRONMENT_ENV_VAR: &str = "APP_ENVIRONMENT";

/// Runtime environment the service is running in.
///
/// Selects which environment-specific configuration file is layered on top of
/// the base configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// Loads the environment from `APP_ENVIRONMENT`, defaulting to [`Environment::Dev`]
    /// when the variable is unset.
    pub fn load() -> Result<Self, io::Error> {
        match std::env::var(ENVIRONMENT_ENV_VAR) {
            Ok(value) => value
                .parse()
                .map_err(|err: String| io::Error::new(io::ErrorKind::InvalidInput, err)),
            Err(std::env::VarError::NotPresent) => Ok(Environment::Dev),
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => f.write_str("dev"),
            Environment::Prod => f.write_str("prod"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!(
                "`{other}` is not a supported environment, use either `dev` or `prod`"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn environment_round_trips_through_display() {
        for env in [Environment::Dev, Environment::Prod] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }
}
