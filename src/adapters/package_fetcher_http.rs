//! Package fetcher implementation using reqwest.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use super::archive;
use crate::domain::{AppError, FetchConfig, ModuleSpec};
use crate::ports::PackageFetcher;

/// Downloads module packages over HTTP(S) and unpacks them.
#[derive(Debug, Clone)]
pub struct HttpPackageFetcher {
    client: Client,
}

impl HttpPackageFetcher {
    /// Create a fetcher with the given download settings.
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl PackageFetcher for HttpPackageFetcher {
    fn fetch(&self, module: &ModuleSpec, dest: &Path) -> Result<(), AppError> {
        let source = &module.package_source;
        let network_error =
            |details: String| AppError::Network { url: source.clone(), details };

        let url = Url::parse(source)
            .map_err(|e| network_error(format!("invalid package URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(network_error(format!("unsupported scheme '{}'", url.scheme())));
        }

        debug!(module = %module.name, %url, "downloading package");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| network_error(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network_error(format!("server responded with {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| network_error(format!("failed to read response body: {}", e)))?;
        debug!(module = %module.name, bytes = body.len(), "downloaded package");

        let files = archive::unpack(&body[..], dest, &module.name)?;
        info!(module = %module.name, files, dest = %dest.display(), "extracted package");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{module, package_archive};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::TempDir;

    fn fetcher() -> HttpPackageFetcher {
        HttpPackageFetcher::new(&FetchConfig { timeout_secs: 5, ..FetchConfig::default() }).unwrap()
    }

    #[test]
    fn fetch_extracts_served_archive() {
        let mut server = mockito::Server::new();
        let body = package_archive(&[
            ("network/main.tf", "resource \"aws_vpc\" \"main\" {}\n"),
            ("network/outputs.tf", "output \"id\" {}\n"),
        ]);
        let mock = server
            .mock("GET", "/network.tgz")
            .match_header("user-agent", mockito::Matcher::Regex("^tfmart/".into()))
            .with_status(200)
            .with_header("content-type", "application/gzip")
            .with_body(body)
            .expect(1)
            .create();

        let dir = TempDir::new().unwrap();
        let spec = module("network", &format!("{}/network.tgz", server.url()));
        fetcher().fetch(&spec, dir.path()).unwrap();

        mock.assert();
        assert!(dir.path().join("main.tf").exists());
        assert!(dir.path().join("outputs.tf").exists());
    }

    #[test]
    fn non_success_status_is_a_network_error() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/missing.tgz").with_status(404).expect(1).create();

        let dir = TempDir::new().unwrap();
        let spec = module("network", &format!("{}/missing.tgz", server.url()));
        let err = fetcher().fetch(&spec, dir.path()).unwrap_err();

        mock.assert();
        assert!(matches!(err, AppError::Network { ref details, .. } if details.contains("404")));
    }

    #[test]
    fn failures_are_not_retried() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/flaky.tgz").with_status(503).expect(1).create();

        let dir = TempDir::new().unwrap();
        let spec = module("network", &format!("{}/flaky.tgz", server.url()));
        assert!(fetcher().fetch(&spec, dir.path()).is_err());
        mock.assert();
    }

    #[test]
    fn corrupt_body_is_an_archive_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/corrupt.tgz")
            .with_status(200)
            .with_body(vec![0x1f, 0x8b, 0x00, 0x01, 0x02])
            .create();

        let dir = TempDir::new().unwrap();
        let spec = module("network", &format!("{}/corrupt.tgz", server.url()));
        let err = fetcher().fetch(&spec, dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Archive { .. }), "unexpected error: {err}");
    }

    #[test]
    fn connection_dropped_mid_body_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let archive = package_archive(&[("network/main.tf", "x".repeat(4096).as_str())]);
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n")
                .unwrap();
            stream.write_all(&archive[..archive.len() / 2]).unwrap();
        });

        let dir = TempDir::new().unwrap();
        let spec = module("network", &format!("http://{}/network.tgz", addr));
        let err = fetcher().fetch(&spec, dir.path()).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, AppError::Network { .. }), "unexpected error: {err}");
        assert!(!dir.path().join("main.tf").exists());
    }

    #[test]
    fn rejects_non_http_sources() {
        let dir = TempDir::new().unwrap();
        let spec = module("network", "file:///etc/passwd");
        let err = fetcher().fetch(&spec, dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Network { ref details, .. } if details.contains("scheme")));
    }
}
