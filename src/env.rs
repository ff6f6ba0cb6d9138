//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`, so config layering can be
//! exercised without mutating the process environment.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

/// A variable that is present but could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    pub name: String,
    pub value: String,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up a variable, treating empty values as unset.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Interpret a variable as a boolean switch.
    ///
    /// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (case-insensitive).
    pub fn flag(&self, name: &str) -> Option<Result<bool, InvalidValue>> {
        let value = self.var(name)?;
        let parsed = match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(InvalidValue {
                name: name.to_string(),
                value,
            }),
        };
        Some(parsed)
    }

    /// Interpret a variable as an unsigned integer.
    pub fn number(&self, name: &str) -> Option<Result<usize, InvalidValue>> {
        let value = self.var(name)?;
        Some(value.trim().parse::<usize>().map_err(|_| InvalidValue {
            name: name.to_string(),
            value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        let env = Env::real();
        assert!(env.var("CARGO_MANIFEST_DIR").is_some());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let env = Env::mock([("EMPTY", "  ")]);
        assert_eq!(env.var("EMPTY"), None);
    }

    #[test]
    fn flag_accepts_common_spellings() {
        let env = Env::mock([("A", "Yes"), ("B", "off"), ("C", "maybe")]);
        assert_eq!(env.flag("A"), Some(Ok(true)));
        assert_eq!(env.flag("B"), Some(Ok(false)));
        assert!(matches!(env.flag("C"), Some(Err(_))));
        assert_eq!(env.flag("D"), None);
    }

    #[test]
    fn number_rejects_garbage() {
        let env = Env::mock([("N", "6"), ("BAD", "six")]);
        assert_eq!(env.number("N"), Some(Ok(6)));
        let err = env.number("BAD").unwrap().unwrap_err();
        assert_eq!(err.value, "six");
    }
}
