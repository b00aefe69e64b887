use std::sync::{Arc, Mutex};

use anyhow::{Result, Context, anyhow};
use rouille::{Server, Request, Response};

use crate::apachelog::{log_combined, Logs};
use crate::config::Config;
use crate::handlers::Site;
use crate::info;

/// Make a handler for Rouille's `Server`.
pub fn server_handler(
    site: Arc<Site>,
    logs: Arc<Mutex<Logs>>,
) -> impl for<'r> Fn(&'r Request) -> Response + Send + Sync + 'static
{
    move |request: &Request| -> Response {
        log_combined(request, &logs, || site.handle(request))
    }
}

pub struct Tlskeys {
    pub crt: Vec<u8>,
    pub key: Vec<u8>,
}

impl Tlskeys {
    /// Read `{base}.crt` and `{base}.key`.
    pub fn read(base: &str) -> Result<Tlskeys> {
        let read = |path: String| {
            std::fs::read(&path).with_context(|| anyhow!("reading {path:?}"))
        };
        Ok(Tlskeys {
            crt: read(format!("{base}.crt"))?,
            key: read(format!("{base}.key"))?,
        })
    }
}

/// Run the server in the current thread; only returns on startup
/// errors.
pub fn run_server(config: &Config) -> Result<()> {
    let site = Arc::new(Site::new(config));
    let logs = Logs::open(config.access_log.as_deref(), config.error_log.as_deref())?;
    let tlskeys = config.tls_keys_file_base.as_deref()
        .map(Tlskeys::read)
        .transpose()?;
    let is_https = tlskeys.is_some();
    let addr = config.listen_addr.as_str();
    let handler = server_handler(site, logs);
    let server =
        if let Some(Tlskeys { crt, key }) = tlskeys {
            Server::new_ssl(addr, handler, crt, key)
        } else {
            Server::new(addr, handler)
        }
        .map_err(|e| anyhow!("starting server on {addr:?}: {e}"))?;
    info!("listening on http{}://{}", if is_https { "s" } else { "" },
          server.server_addr());
    server.run();
    Ok(())
}
