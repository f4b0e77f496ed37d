//! Command-line and environment configuration.
//!
//! Every setting can be given as a flag or through the environment; flags
//! win. A `.env` file, searched from the working directory upward, is loaded
//! first and never overrides variables that are already set. Values are read
//! once at startup.
//!
//! | Flag                       | Env                      | Default                            |
//! |----------------------------|--------------------------|------------------------------------|
//! | `--host`                   | `LISTEN_HOST`            | `0.0.0.0`                          |
//! | `--port`                   | `PORT`                   | `5000`                             |
//! | `--static-dir`             | `STATIC_DIR`             | `frontend/dist`                    |
//! | `--judge0-url`             | `JUDGE0_URL`             | `https://judge0-ce.p.rapidapi.com` |
//! | `--rapidapi-host`          | `RAPIDAPI_HOST`          | `judge0-ce.p.rapidapi.com`         |
//! | `--rapid-api-key`          | `RAPID_API_KEY`          | unset                              |
//! | `--execution-timeout-secs` | `EXECUTION_TIMEOUT_SECS` | `30`                               |
//! | `--keep-empty-rooms`       | `KEEP_EMPTY_ROOMS`       | `false`                            |
//! | `--log-level`              | `LOG_LEVEL`              | `info` (`RUST_LOG` overrides)      |

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::{Parser, builder::FalseyValueParser};
use coderoom_executor::{
    Judge0Config,
    judge0::{DEFAULT_BASE_URL, DEFAULT_RAPIDAPI_HOST},
};

/// Real-time collaborative code rooms.
#[derive(Debug, Clone, Parser)]
#[command(name = "coderoom-server", version)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "LISTEN_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
    /// Directory holding the built single-page app.
    #[arg(long, env = "STATIC_DIR", default_value = "frontend/dist")]
    pub static_dir: PathBuf,
    /// Judge0 base URL.
    #[arg(long, env = "JUDGE0_URL", default_value = DEFAULT_BASE_URL)]
    pub judge0_url: String,
    /// `X-RapidAPI-Host` header sent to Judge0.
    #[arg(long, env = "RAPIDAPI_HOST", default_value = DEFAULT_RAPIDAPI_HOST)]
    pub rapidapi_host: String,
    /// RapidAPI key for Judge0. Without it every execution fails.
    #[arg(long, env = "RAPID_API_KEY", hide_env_values = true)]
    pub rapid_api_key: Option<String>,
    /// Seconds to wait for one execution.
    #[arg(long, env = "EXECUTION_TIMEOUT_SECS", default_value_t = 30)]
    pub execution_timeout_secs: u64,
    /// Keep rooms in memory after their last participant leaves.
    #[arg(long, env = "KEEP_EMPTY_ROOMS", value_parser = FalseyValueParser::new())]
    pub keep_empty_rooms: bool,
    /// Tracing filter used when `RUST_LOG` is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Settings for the execution client.
    #[must_use]
    pub fn judge0(&self) -> Judge0Config {
        Judge0Config {
            base_url: self.judge0_url.clone(),
            rapidapi_host: self.rapidapi_host.clone(),
            api_key: self.rapid_api_key.clone(),
            timeout: Duration::from_secs(self.execution_timeout_secs),
        }
    }
}
