//! Process settings from command-line flags and environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::observability::logging::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "vhost-proxy")]
#[command(about = "Host-based HTTP reverse proxy", long_about = None)]
pub struct Settings {
    /// Path to the virtual host rule file (TOML).
    #[arg(short, long, env = "PROXY_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "PROXY_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PROXY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Deadline for the origin to answer, in seconds.
    #[arg(long, env = "PROXY_UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "PROXY_METRICS_ADDRESS")]
    pub metrics_address: Option<SocketAddr>,

    /// Log output format.
    #[arg(long, env = "PROXY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn listen_address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
