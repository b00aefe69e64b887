use std::env::VarError;

use anyhow::{Result, bail};

/// Get an env var as a String; decoding failures are reported as
/// errors, a missing var as `None`.
pub fn getenv(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e {
            VarError::NotPresent => Ok(None),
            VarError::NotUnicode(_) => bail!("{name:?} env var is not unicode"),
        }
    }
}
