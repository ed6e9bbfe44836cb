//! Startup configuration parsed from the command line.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use numbers_engine::{EngineSettings, FetchSettings};

pub const MIN_RESPONSE_TIMEOUT_MS: u64 = 50;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 10;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "numbers")]
#[command(about = "Serve merged, sorted integer lists fetched from upstream URLs", long_about = None)]
pub struct Cli {
    /// Port to accept requests on, between 1 and 65535
    #[arg(long, default_value_t = 8000)]
    pub port: u32,

    /// Number of fetch workers, at least 1
    #[arg(long, default_value_t = 32)]
    pub workers: usize,

    /// Time in milliseconds the service has to answer, at least 50
    #[arg(long, default_value_t = 500)]
    pub resp_timeout: u64,

    /// Time in milliseconds to wait for one upstream answer, at least 10
    #[arg(long, default_value_t = 450)]
    pub req_timeout: u64,

    /// Append logs to this file instead of the terminal
    #[arg(long)]
    pub log: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be between 1 and 65535, got {0}")]
    Port(u32),
    #[error("worker count must be at least 1, got {0}")]
    Workers(usize),
    #[error("response timeout must be at least 50ms, got {0}ms")]
    ResponseTimeout(u64),
    #[error("request timeout must be at least 10ms, got {0}ms")]
    RequestTimeout(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub workers: usize,
    pub response_timeout: Duration,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn validate(self) -> Result<ServiceConfig, ConfigError> {
        let port = u16::try_from(self.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ConfigError::Port(self.port))?;
        if self.workers < 1 {
            return Err(ConfigError::Workers(self.workers));
        }
        if self.resp_timeout < MIN_RESPONSE_TIMEOUT_MS {
            return Err(ConfigError::ResponseTimeout(self.resp_timeout));
        }
        if self.req_timeout < MIN_REQUEST_TIMEOUT_MS {
            return Err(ConfigError::RequestTimeout(self.req_timeout));
        }

        Ok(ServiceConfig {
            port,
            workers: self.workers,
            response_timeout: Duration::from_millis(self.resp_timeout),
            request_timeout: Duration::from_millis(self.req_timeout),
            log_file: self.log,
        })
    }
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            workers: self.workers,
            fetch: FetchSettings::with_request_timeout(self.request_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("numbers").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&[]).validate().unwrap();
        assert_eq!(
            config,
            ServiceConfig {
                port: 8000,
                workers: 32,
                response_timeout: Duration::from_millis(500),
                request_timeout: Duration::from_millis(450),
                log_file: None,
            }
        );
        assert_eq!(config.listen_addr().port(), 8000);
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--port",
            "9090",
            "--workers",
            "4",
            "--resp-timeout",
            "50",
            "--req-timeout",
            "10",
            "--log",
            "service.log",
        ])
        .validate()
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.workers, 4);
        assert_eq!(config.response_timeout, Duration::from_millis(50));
        assert_eq!(config.request_timeout, Duration::from_millis(10));
        assert_eq!(config.log_file, Some(PathBuf::from("service.log")));

        let settings = config.engine_settings();
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.fetch.request_timeout, Duration::from_millis(10));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cases = [
            (vec!["--port", "0"], ConfigError::Port(0)),
            (vec!["--port", "65536"], ConfigError::Port(65536)),
            (vec!["--workers", "0"], ConfigError::Workers(0)),
            (vec!["--resp-timeout", "49"], ConfigError::ResponseTimeout(49)),
            (vec!["--req-timeout", "9"], ConfigError::RequestTimeout(9)),
        ];
        for (args, expected) in cases {
            assert_eq!(parse(&args).validate(), Err(expected), "args {args:?}");
        }
    }

    #[test]
    fn non_numeric_values_fail_to_parse() {
        assert!(Cli::try_parse_from(["numbers", "--workers", "many"]).is_err());
        assert!(Cli::try_parse_from(["numbers", "--port", "-1"]).is_err());
    }
}
