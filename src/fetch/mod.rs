// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What a single GET produced, as far as the caller needs to branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status 200; the decoded response body.
    Success { body: String },
    /// Any other status. Not an error, the caller decides what to do.
    Failure { status: u16 },
}

/// Source of the raw delimited export.
///
/// Transport problems (DNS, refused connection, broken body) are `Err`;
/// an HTTP status other than 200 is a [`FetchOutcome::Failure`].
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchOutcome>;
}

/// Blocking HTTP fetcher. Sends a bare GET: no auth, no extra headers, no query.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        // the export is large and slow to generate; wait as long as it takes
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        let url = Url::parse(url).with_context(|| format!("parsing URL {}", url))?;

        let resp = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {}", url))?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "download not successful");
            return Ok(FetchOutcome::Failure {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .with_context(|| format!("reading body from {}", url))?;
        info!(%url, bytes = body.len(), "downloaded");
        debug!(first_line = body.lines().next().unwrap_or(""), "header row");

        Ok(FetchOutcome::Success { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Talks straight to the local listener even if the environment sets a proxy.
    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::with_client(Client::builder().no_proxy().build().unwrap())
    }

    /// Serve exactly one canned HTTP response on a random local port.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            // drain the request head before answering
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }

            let resp = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(resp.as_bytes()).unwrap();
        });

        (format!("http://{}/metadata.csv", addr), handle)
    }

    #[test]
    fn test_ok_returns_body() -> Result<()> {
        let (url, handle) = serve_once("200 OK", "ID|NAME\n1|Paracetamol\n");
        let outcome = local_fetcher().fetch(&url)?;
        handle.join().unwrap();

        assert_eq!(
            outcome,
            FetchOutcome::Success {
                body: "ID|NAME\n1|Paracetamol\n".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn test_not_found_is_data_not_error() -> Result<()> {
        let (url, handle) = serve_once("404 Not Found", "gone");
        let outcome = local_fetcher().fetch(&url)?;
        handle.join().unwrap();

        assert_eq!(outcome, FetchOutcome::Failure { status: 404 });
        Ok(())
    }

    #[test]
    fn test_other_2xx_is_failure() -> Result<()> {
        let (url, handle) = serve_once("202 Accepted", "queued");
        let outcome = local_fetcher().fetch(&url)?;
        handle.join().unwrap();

        assert_eq!(outcome, FetchOutcome::Failure { status: 202 });
        Ok(())
    }

    #[test]
    fn test_refused_connection_is_error() -> Result<()> {
        // grab a free port, then close it so nothing is listening
        let port = {
            let l = TcpListener::bind("127.0.0.1:0")?;
            l.local_addr()?.port()
        };
        let url = format!("http://127.0.0.1:{}/metadata.csv", port);

        let err = local_fetcher().fetch(&url).unwrap_err();
        assert!(err.to_string().contains("GET"));
        assert!(err.downcast_ref::<reqwest::Error>().is_some());
        Ok(())
    }

    #[test]
    fn test_invalid_url_is_error() -> Result<()> {
        let err = HttpFetcher::new()?.fetch("not a url").unwrap_err();
        assert!(err.to_string().contains("parsing URL"));
        Ok(())
    }
}
