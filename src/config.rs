//! Server configuration, read from the environment; the command line
//! can override each value (see `src/bin/formsite.rs`).

use std::path::PathBuf;

use anyhow::Result;

use crate::util::getenv;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SITE_TITLE: &str = "Rust Rouille HTMX Form";
pub const DEFAULT_MAX_ALLOCATIONS: u32 = 100000;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be of the form host:port, got {value:?}")]
    InvalidListenAddr { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: String,
    pub site_title: String,
    /// Append access log lines here; stderr if `None`.
    pub access_log: Option<PathBuf>,
    /// Same for handler errors.
    pub error_log: Option<PathBuf>,
    /// Per request limit for the number of HTML nodes.
    pub max_allocations: u32,
    /// Path without the `.crt` / `.key` suffixes; plain HTTP if `None`.
    pub tls_keys_file_base: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            site_title: DEFAULT_SITE_TITLE.into(),
            access_log: None,
            error_log: None,
            max_allocations: DEFAULT_MAX_ALLOCATIONS,
            tls_keys_file_base: None,
        }
    }
}

pub fn check_listen_addr(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidListenAddr { var, value: value.into() };
    let (host, port) = value.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        Err(invalid())?
    }
    Ok(())
}

pub fn parse_max_allocations(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value: value.into() })
    }
}

impl Config {
    /// Read `LISTEN_HTTP`, `SITE_TITLE`, `ACCESS_LOG`, `ERROR_LOG`,
    /// `MAX_ALLOCATIONS` and `TLSKEYSFILEBASE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(getenv)
    }

    /// Same as `from_env` but with the variables coming from `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<Option<String>>
    ) -> Result<Self> {
        let mut config = Config::default();
        if let Some(addr) = lookup("LISTEN_HTTP")? {
            check_listen_addr("LISTEN_HTTP", &addr)?;
            config.listen_addr = addr;
        }
        if let Some(title) = lookup("SITE_TITLE")? {
            if title.trim().is_empty() {
                Err(ConfigError::Empty { var: "SITE_TITLE" })?
            }
            config.site_title = title;
        }
        config.access_log = lookup("ACCESS_LOG")?
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        config.error_log = lookup("ERROR_LOG")?
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        if let Some(n) = lookup("MAX_ALLOCATIONS")? {
            config.max_allocations = parse_max_allocations("MAX_ALLOCATIONS", &n)?;
        }
        config.tls_keys_file_base = lookup("TLSKEYSFILEBASE")?
            .filter(|s| !s.is_empty());
        Ok(config)
    }
}
