//! CLI/environment configuration surface (§6's "CLI surface / environment").

use crate::error::{ErrorKind, LwsError, LwsResult};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[clap(name = "lws-server", about = "CryptoNote-style light-wallet server")]
pub struct ServerConfig {
    /// Bind URI, e.g. `http://0.0.0.0:8080` or `http://[::1]:8080`.
    #[clap(long, env = "LWS_BIND_URI", default_value = "http://127.0.0.1:8080")]
    pub bind_uri: String,

    /// Number of worker threads servicing HTTP requests.
    #[clap(long, env = "LWS_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Path to the on-disk KV environment.
    #[clap(long, env = "LWS_DB_PATH", default_value = "./lws-data")]
    pub db_path: PathBuf,

    /// Maximum size, in bytes, the KV environment's memory map may grow to.
    #[clap(long, env = "LWS_DB_MAP_SIZE", default_value_t = 10 * 1024 * 1024 * 1024)]
    pub db_map_size: usize,

    /// Base URL of the upstream daemon RPC oracle.
    #[clap(long, env = "LWS_DAEMON_URL", default_value = "http://127.0.0.1:18081")]
    pub daemon_url: String,

    /// Per-call send timeout to the daemon, in seconds.
    #[clap(long, env = "LWS_DAEMON_SEND_TIMEOUT_SECS", default_value_t = 10)]
    pub daemon_send_timeout_secs: u64,

    /// Per-call receive timeout to the daemon, in seconds.
    #[clap(long, env = "LWS_DAEMON_RECV_TIMEOUT_SECS", default_value_t = 20)]
    pub daemon_recv_timeout_secs: u64,

    /// Maximum number of pending (unapproved) requests the queue may hold.
    #[clap(long, env = "LWS_MAX_PENDING_REQUESTS", default_value_t = 10_000)]
    pub max_pending_requests: u64,
}

impl ServerConfig {
    pub fn worker_threads_or_default(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get)
    }

    pub fn daemon_send_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon_send_timeout_secs)
    }

    pub fn daemon_recv_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon_recv_timeout_secs)
    }

    /// Parses `bind_uri` into `(host, port)`, recognising bracketed IPv6
    /// literals and defaulting the port to 8080.
    pub fn parse_bind_address(&self) -> LwsResult<(String, u16)> {
        let rest = self
            .bind_uri
            .strip_prefix("http://")
            .ok_or_else(|| LwsError::new(ErrorKind::InvalidUriScheme))?;

        if let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped
                .find(']')
                .ok_or_else(|| LwsError::with_detail(ErrorKind::BadAddress, "unterminated IPv6 literal"))?;
            let host = &stripped[..end];
            let tail = &stripped[end + 1..];
            let port = match tail.strip_prefix(':') {
                Some(p) => p
                    .parse::<u16>()
                    .map_err(|_| LwsError::with_detail(ErrorKind::BadAddress, "invalid port"))?,
                None => 8080,
            };
            return Ok((host.to_string(), port));
        }

        match rest.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| LwsError::with_detail(ErrorKind::BadAddress, "invalid port"))?;
                Ok((host.to_string(), port))
            }
            None => Ok((rest.to_string(), 8080)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(bind_uri: &str) -> ServerConfig {
        ServerConfig {
            bind_uri: bind_uri.to_string(),
            worker_threads: None,
            db_path: PathBuf::from("/tmp/lws"),
            db_map_size: 1024,
            daemon_url: "http://127.0.0.1:18081".into(),
            daemon_send_timeout_secs: 10,
            daemon_recv_timeout_secs: 20,
            max_pending_requests: 10,
        }
    }

    #[test]
    fn defaults_port_to_8080() {
        let (host, port) = cfg("http://0.0.0.0").parse_bind_address().unwrap();
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 8080);
    }

    #[test]
    fn parses_explicit_port() {
        let (host, port) = cfg("http://example.com:9999").parse_bind_address().unwrap();
        assert_eq!(host, "example.com");
        assert_eq!(port, 9999);
    }

    #[test]
    fn parses_ipv6_literal() {
        let (host, port) = cfg("http://[::1]:8080").parse_bind_address().unwrap();
        assert_eq!(host, "::1");
        assert_eq!(port, 8080);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = cfg("https://example.com").parse_bind_address().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUriScheme);
    }
}
