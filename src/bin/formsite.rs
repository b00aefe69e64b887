use std::path::PathBuf;

use anyhow::Result;
use clap::Parser as ClapParser;
use formsite::config::{Config, ConfigError, check_listen_addr};
use formsite::server::run_server;

#[derive(clap::Parser, Debug)]
/// Serve the demo form site. Every option falls back to its env var,
/// then to the built-in default.
struct Args {
    /// Address to listen on, host:port (env LISTEN_HTTP)
    #[clap(long)]
    listen: Option<String>,

    /// Title shown in the page header (env SITE_TITLE)
    #[clap(long)]
    site_title: Option<String>,

    /// Append access log entries to this file instead of stderr
    /// (env ACCESS_LOG)
    #[clap(long)]
    access_log: Option<PathBuf>,

    /// Append handler errors to this file instead of stderr (env
    /// ERROR_LOG)
    #[clap(long)]
    error_log: Option<PathBuf>,

    /// Maximum number of HTML nodes per request (env MAX_ALLOCATIONS)
    #[clap(long)]
    max_allocations: Option<u32>,

    /// Serve HTTPS using `$path.crt` and `$path.key` (env
    /// TLSKEYSFILEBASE)
    #[clap(long)]
    tls_keys: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(listen) = args.listen {
        check_listen_addr("--listen", &listen)?;
        config.listen_addr = listen;
    }
    if let Some(title) = args.site_title {
        if title.trim().is_empty() {
            Err(ConfigError::Empty { var: "--site-title" })?
        }
        config.site_title = title;
    }
    if let Some(n) = args.max_allocations {
        if n == 0 {
            Err(ConfigError::InvalidNumber { var: "--max-allocations",
                                             value: n.to_string() })?
        }
        config.max_allocations = n;
    }
    if args.access_log.is_some() {
        config.access_log = args.access_log;
    }
    if args.error_log.is_some() {
        config.error_log = args.error_log;
    }
    if args.tls_keys.is_some() {
        config.tls_keys_file_base = args.tls_keys;
    }
    run_server(&config)
}
