use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::environment::{self, Environment, Variable};

/// A value written in the configuration, or the name of the environment variable holding it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Secret {
    Plain(String),
    FromEnvironment { variable: Variable },
}

impl Secret {
    pub fn from_environment(variable: &str) -> Self {
        Secret::FromEnvironment {
            variable: variable.into(),
        }
    }

    pub fn resolve(&self, environment: impl Environment) -> Result<String, environment::Error> {
        match self {
            Secret::Plain(value) => Ok(value.clone()),
            Secret::FromEnvironment { variable } => environment.read(variable),
        }
    }

    /// Like [`Secret::resolve`], but an unset variable is `None`.
    pub fn resolve_optional(
        &self,
        environment: impl Environment,
    ) -> Result<Option<String>, environment::Error> {
        match self.resolve(environment) {
            Ok(value) => Ok(Some(value)),
            Err(environment::Error::NonExistentVariable(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret::Plain(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret::Plain(value.to_string())
    }
}
