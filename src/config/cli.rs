//! Command-line flags and host-reported configuration values.
//!
//! Flags use the `-name=value` / `--name=value` syntax; a bare `-name` is
//! present with an empty value. Host values are looked up by key and are
//! absent unless the host reports them.

use std::collections::HashMap;

/// Parsed command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    params: HashMap<String, String>,
}

impl CommandLine {
    /// Create an empty command line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse flags from an argument list (without the program name).
    ///
    /// Arguments that do not start with `-` are ignored; a repeated flag
    /// keeps its last value.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = HashMap::new();
        for arg in args {
            let arg = arg.as_ref();
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                continue;
            };

            let (name, value) = flag.split_once('=').unwrap_or((flag, ""));
            if name.is_empty() {
                continue;
            }
            params.insert(name.to_string(), value.to_string());
        }
        Self { params }
    }

    /// Parse the current process arguments.
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Builder: set a flag.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Get a flag value; `Some("")` for a bare flag.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Check whether a flag is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Number of parsed flags.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check whether no flags were given.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Source of host-reported configuration values.
pub trait HostConfig {
    /// Raw text of `key`, or `None` when the host does not report it.
    fn text(&self, key: &str) -> Option<String>;

    /// Integer value of `key`; unparseable values read as 0.
    fn int(&self, key: &str) -> Option<i64> {
        self.text(key).map(|value| parse_int(&value))
    }

    /// Float value of `key`; unparseable values read as 0.
    fn float(&self, key: &str) -> Option<f64> {
        self.text(key)
            .map(|value| value.trim().parse::<f64>().unwrap_or(0.0))
    }
}

/// In-memory host values.
#[derive(Debug, Clone, Default)]
pub struct MapHostConfig {
    values: HashMap<String, String>,
}

impl MapHostConfig {
    /// Create an empty host config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }
}

impl HostConfig for MapHostConfig {
    fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Host values read from process environment variables of the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvHostConfig;

impl HostConfig for EnvHostConfig {
    fn text(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Parse an integer, reading anything unparseable as 0.
pub(crate) fn parse_int(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}
