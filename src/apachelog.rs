//! Write HTTP access log files in the Combined Log Format (extended
//! Common Log Format) for access logs (Apache style), as per
//! <https://httpd.apache.org/docs/2.4/logs.html>.

use std::fs::File;
use std::io::{stderr, BufWriter, Write};
use std::mem::swap;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Result, Context, anyhow};
use chrono::{DateTime, Datelike, Timelike, Utc};
use rouille::{Request, Response, ResponseBody};

use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::webutils::errorpage_from_status;
use crate::warn;

static MONTHS: &[&str; 12] = &["Jan", "Feb", "Mar", "Apr", "May", "Jun",
                               "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

// "06/Dec/2023:02:02:47 +0000"
pub fn write_time(
    outp: &mut impl Write,
    time: SystemTime
) -> Result<()> {
    let dt: DateTime<Utc> = DateTime::from(time);
    write!(outp, "{:02}/{}/{:04}:{:02}:{:02}:{:02} +0000",
           dt.day(), MONTHS[dt.month0() as usize], dt.year(),
           dt.hour(), dt.minute(), dt.second())?;
    Ok(())
}

/// `"GET /form?x=1 HTTP/1.1"` without the quotes. rouille doesn't
/// tell us the HTTP version.
pub fn request_line(request: &Request) -> String {
    format!("{} {} HTTP/1.1", request.method(), request.raw_url())
}

// Apache:
// 18.134.151.89 - - [06/Dec/2023:02:02:47 +0100] "GET /login.jsp HTTP/1.1" 404 447 "-" "'Cloud mapping experiment. Contact research@pdrlabs.net'"
// We also add the duration at the end.

/// Write one access.log entry.
pub fn write_combined(
    outp: &mut impl Write,
    request: &Request,
    now: SystemTime,
    duration: Duration,
    response: &mut Response, // temporarily swaps out ResponseBody and back
) -> Result<()> {
    write!(outp, "{} - - [", request.remote_addr().ip())?;
    write_time(outp, now)?;
    let len = {
        // The body length is only available by taking the body
        // apart, then put it back together.
        let mut responsebody = ResponseBody::empty();
        swap(&mut responsebody, &mut response.data);
        let (data, length) = responsebody.into_reader_and_size();
        responsebody =
            if let Some(len) = length {
                ResponseBody::from_reader_and_size(data, len)
            } else {
                ResponseBody::from_reader(data)
            };
        swap(&mut responsebody, &mut response.data);
        length
    };
    writeln!(outp, "] {:?} {} {} {:?} {:?} {duration:?}",
             request_line(request),
             response.status_code,
             len.unwrap_or(0),
             request.header("Referer").unwrap_or("-"),
             request.header("User-Agent").unwrap_or("-"),
    )?;
    outp.flush()?;
    Ok(())
}

/// Write one error.log entry.
fn write_error(
    outp: &mut impl Write,
    request: &Request,
    now: SystemTime,
    duration: Duration,
    err: anyhow::Error,
) -> Result<()> {
    write!(outp, "[")?;
    write_time(outp, now)?;
    writeln!(outp, "] [error] [client {}] {:?} {duration:?}: {err:#}",
             request.remote_addr().ip(),
             request_line(request))?;
    outp.flush()?;
    Ok(())
}

/// Panic log to stderr.
fn write_panic_stderr(
    request: &Request,
    duration: Duration
) {
    let mut outp = BufWriter::new(stderr().lock());
    // We need to feed stderr to a service like daemontools
    // anyway, hence don't print timestamps.
    let _ = writeln!(&mut outp, "[panic] handling {:?} after {duration:?}",
                     request_line(request));
    let _ = outp.flush();
}

/// The log outputs to write to: access_log for every response made by
/// a handler, error_log when the handler failed. The code calls
/// flush once per entry.
pub struct Logs {
    pub access_log: Box<dyn Write + Send + Sync>,
    pub error_log: Box<dyn Write + Send + Sync>,
}

pub fn open_log_output(path: &Path) -> Result<Box<dyn Write + Send + Sync>> {
    let mut outp = File::options();
    outp.write(true).append(true).create(true);
    Ok(Box::new(BufWriter::new(outp.open(path).with_context(
        || anyhow!("opening log for output: {:?}", path.to_string_lossy()))?)))
}

impl Logs {
    /// Both outputs to stderr.
    pub fn stderr() -> Arc<Mutex<Logs>> {
        Arc::new(Mutex::new(Logs {
            access_log: Box::new(stderr()),
            error_log: Box::new(stderr()),
        }))
    }

    /// Files are opened for appending; `None` means stderr.
    pub fn open(
        access_log: Option<&Path>,
        error_log: Option<&Path>,
    ) -> Result<Arc<Mutex<Logs>>>
    {
        let open = |path: Option<&Path>| -> Result<Box<dyn Write + Send + Sync>> {
            match path {
                Some(path) => open_log_output(path),
                None => Ok(Box::new(stderr())),
            }
        };
        Ok(Arc::new(Mutex::new(Logs {
            access_log: open(access_log)?,
            error_log: open(error_log)?,
        })))
    }
}

// Can't use rouille::log_custom: the handler's Err result is only
// available within the handler. Thus copy and adapt its code.

/// Run `handler`, log its response to the access log, or, if it
/// failed, log the error to the error log and return a 500 page
/// instead. Panics are logged to stderr and resumed.
pub fn log_combined<F>(
    request: &Request,
    logs: &Mutex<Logs>,
    handler: F
) -> Response
where
    F: FnOnce() -> Result<Response>,
{
    let start_instant = Instant::now();

    // We always resume unwinding afterwards.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(handler));
    let elapsed = start_instant.elapsed();
    let now = SystemTime::now();

    let lock_logs = move || logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    match result {
        Ok(Ok(mut response)) => {
            let mut logs = lock_logs();
            if let Err(e) = write_combined(&mut logs.access_log, request, now, elapsed,
                                           &mut response) {
                warn!("could not write to access log: {e:#}")
            }
            response
        }
        Ok(Err(err)) => {
            {
                let mut logs = lock_logs();
                if let Err(e) = write_error(&mut logs.error_log, request, now, elapsed, err) {
                    warn!("could not write to error log: {e:#}")
                }
            }
            let mut response = errorpage_from_status(
                HttpResponseStatusCode::InternalServerError500);
            let mut logs = lock_logs();
            if let Err(e) = write_combined(&mut logs.access_log, request, now, elapsed,
                                           &mut response) {
                warn!("could not write to access log: {e:#}")
            }
            response
        }
        Err(payload) => {
            write_panic_stderr(request, elapsed);
            // The panic handler will print the payload contents
            panic::resume_unwind(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::time::UNIX_EPOCH;
    use anyhow::bail;

    // A log output that can be inspected after being moved into Logs.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn logs() -> (Mutex<Logs>, SharedBuf, SharedBuf) {
        let access = SharedBuf::default();
        let error = SharedBuf::default();
        (Mutex::new(Logs {
            access_log: Box::new(access.clone()),
            error_log: Box::new(error.clone()),
        }), access, error)
    }

    #[test]
    fn t_write_time() -> Result<()> {
        let mut v = Vec::new();
        // 2023-12-06T02:02:47Z
        write_time(&mut v, UNIX_EPOCH + Duration::from_secs(1701828167))?;
        assert_eq!(String::from_utf8(v)?, "06/Dec/2023:02:02:47 +0000");
        Ok(())
    }

    #[test]
    fn t_write_combined() -> Result<()> {
        let request = Request::fake_http(
            "GET", "/form?a=1",
            vec![("User-Agent".into(), "curl/8".into())],
            vec![]);
        let mut response = Response::text("hello");
        let mut v = Vec::new();
        write_combined(&mut v, &request, UNIX_EPOCH + Duration::from_secs(1701828167),
                       Duration::from_millis(2), &mut response)?;
        assert_eq!(String::from_utf8(v)?,
                   "127.0.0.1 - - [06/Dec/2023:02:02:47 +0000] \
                    \"GET /form?a=1 HTTP/1.1\" 200 5 \"-\" \"curl/8\" 2ms\n");
        // body is still intact
        let (mut data, len) = response.data.into_reader_and_size();
        let mut s = String::new();
        data.read_to_string(&mut s)?;
        assert_eq!((s.as_str(), len), ("hello", Some(5)));
        Ok(())
    }

    #[test]
    fn t_log_combined_error() {
        let (logs, access, error) = logs();
        let request = Request::fake_http("POST", "/form", vec![], vec![]);
        let response = log_combined(&request, &logs, || bail!("it broke"));
        assert_eq!(response.status_code, 500);
        assert!(error.contents().contains("[error] [client 127.0.0.1] \"POST /form HTTP/1.1\""));
        assert!(error.contents().contains(": it broke\n"));
        assert!(access.contents().contains("\"POST /form HTTP/1.1\" 500 "));
    }

    #[test]
    fn t_log_combined_ok() {
        let (logs, access, error) = logs();
        let request = Request::fake_http("GET", "/", vec![], vec![]);
        let response = log_combined(&request, &logs, || Ok(Response::text("x")));
        assert_eq!(response.status_code, 200);
        assert!(access.contents().contains("\"GET / HTTP/1.1\" 200 1 \"-\" \"-\""));
        assert_eq!(error.contents(), "");
    }
}
