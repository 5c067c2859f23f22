//! Connection-related data models.
//!
//! This module defines types for pool registration, naming strategies and the
//! resolved settings handed to an engine when connecting.

use crate::config::PoolDefaults;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSQL,
    /// Includes MariaDB
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Initialisms kept as a single word by the gonic strategy.
const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// How Rust type and field names map onto table and column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `UserID` -> `user_i_d`
    #[default]
    Snake,
    /// Names are used verbatim.
    Same,
    /// Snake case that keeps common initialisms together: `UserID` -> `user_id`
    Gonic,
}

impl NamingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Same => "same",
            Self::Gonic => "gonic",
        }
    }

    /// Map a type or field name to its database name.
    pub fn map(&self, name: &str) -> String {
        match self {
            Self::Same => name.to_string(),
            Self::Snake => snake_case(name),
            Self::Gonic => gonic_case(name),
        }
    }

    /// Map a type name to a table name, with the prefix prepended verbatim.
    pub fn table_name(&self, prefix: &str, name: &str) -> String {
        format!("{}{}", prefix, self.map(name))
    }
}

impl std::fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snake" => Ok(Self::Snake),
            "same" => Ok(Self::Same),
            "gonic" => Ok(Self::Gonic),
            other => Err(format!(
                "Unknown naming strategy '{other}'. Expected one of: snake, same, gonic"
            )),
        }
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn gonic_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '_' {
            i += 1;
            continue;
        }
        // Longest initialism at this position that ends on a word boundary.
        let initialism = COMMON_INITIALISMS
            .iter()
            .filter(|word| {
                let end = i + word.len();
                end <= chars.len()
                    && chars[i..end].iter().copied().eq(word.chars())
                    && chars
                        .get(end)
                        .is_none_or(|c| c.is_ascii_uppercase() || !c.is_alphabetic())
            })
            .max_by_key(|word| word.len());

        if let Some(word) = initialism {
            words.push(word.to_ascii_lowercase());
            i += word.len();
            continue;
        }

        let start = i;
        i += 1;
        if chars[start].is_ascii_uppercase() {
            // Run of capitals forms one word, minus the capital that starts the next word.
            while i < chars.len() && chars[i].is_ascii_uppercase() {
                i += 1;
            }
            if i - start > 1 && i < chars.len() && chars[i].is_ascii_lowercase() {
                i -= 1;
            }
        }
        while i < chars.len() && !chars[i].is_ascii_uppercase() && chars[i] != '_' {
            i += 1;
        }
        words.push(chars[start..i].iter().collect::<String>().to_lowercase());
    }

    words.join("_")
}

/// Diagnostic verbosity applied to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Statements and debug diagnostics are logged.
    Debug,
    /// Only errors are reported.
    Error,
}

impl Verbosity {
    pub fn from_debug(debug: bool) -> Self {
        if debug { Self::Debug } else { Self::Error }
    }
}

/// Per-pool tunables supplied at registration.
///
/// Unset or zero values fall back to the registry's [`PoolDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterOptions {
    /// Table name prefix
    #[serde(default)]
    pub prefix: String,
    /// Log statements when true, errors only otherwise
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub naming_strategy: NamingStrategy,
    pub conn_max_lifetime: Option<Duration>,
    pub max_idle_conns: Option<u32>,
    pub max_open_conns: Option<u32>,
}

impl RegisterOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_naming_strategy(mut self, naming_strategy: NamingStrategy) -> Self {
        self.naming_strategy = naming_strategy;
        self
    }
}

/// A named database target as registered by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorConfig {
    pub name: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub dsn: String,
    #[serde(default)]
    pub options: RegisterOptions,
}

impl DescriptorConfig {
    pub fn new(name: impl Into<String>, dsn: impl Into<String>, options: RegisterOptions) -> Self {
        Self {
            name: name.into(),
            dsn: dsn.into(),
            options,
        }
    }

    /// Get a display-safe version of the DSN (credentials masked).
    pub fn masked_dsn(&self) -> String {
        mask_dsn(&self.dsn)
    }

    /// Resolve the options against process-wide defaults.
    pub fn resolve(&self, defaults: &PoolDefaults) -> ConnectSettings {
        let opts = &self.options;
        ConnectSettings {
            name: self.name.clone(),
            dsn: self.dsn.clone(),
            prefix: opts.prefix.clone(),
            naming_strategy: opts.naming_strategy,
            conn_max_lifetime: opts
                .conn_max_lifetime
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.conn_max_lifetime),
            max_idle_conns: opts
                .max_idle_conns
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_idle_conns),
            max_open_conns: opts
                .max_open_conns
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_open_conns),
            verbosity: Verbosity::from_debug(opts.debug),
        }
    }
}

/// Fully resolved settings an engine connects with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectSettings {
    pub name: String,
    pub dsn: String,
    pub prefix: String,
    pub naming_strategy: NamingStrategy,
    pub conn_max_lifetime: Duration,
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    pub verbosity: Verbosity,
}

impl ConnectSettings {
    pub fn masked_dsn(&self) -> String {
        mask_dsn(&self.dsn)
    }
}

/// Pool information returned by the registry (no secrets exposed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    pub name: String,
    pub masked_dsn: String,
    pub prefix: String,
    pub naming_strategy: NamingStrategy,
    pub debug: bool,
    /// False once the pool has been closed and not yet reconnected.
    pub connected: bool,
}

fn mask_dsn(dsn: &str) -> String {
    // Replace the password in the userinfo section, if any
    let start = dsn.find("://").map(|pos| pos + 3).unwrap_or(0);
    if let Some(at_pos) = dsn[start..].rfind('@').map(|pos| start + pos) {
        if let Some(colon_pos) = dsn[start..at_pos].find(':').map(|pos| start + pos) {
            return format!("{}****{}", &dsn[..=colon_pos], &dsn[at_pos..]);
        }
    }
    dsn.to_string()
}
