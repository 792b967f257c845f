//! Node Configuration
//!
//! Parsed once from command-line flags and immutable afterwards.
//!
//! ```text
//! peercache --port 8001 [--api] [--api-addr 0.0.0.0:9999] [--host 127.0.0.1]
//!           [--peer http://127.0.0.1:8001 ...] [--cache-bytes 2048] [--timeout-ms 500]
//! ```

use anyhow::{Result, bail};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_API_ADDR: &str = "0.0.0.0:9999";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CACHE_BYTES: usize = 2 << 10;
const DEFAULT_PEER_PORTS: [u16; 3] = [8001, 8002, 8003];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub port: u16,
    pub host: String,
    /// Also serve the client-facing `/api` endpoint.
    pub api: bool,
    pub api_addr: SocketAddr,
    /// Every node of the deployment, this one included.
    pub peers: Vec<String>,
    pub cache_bytes: usize,
    pub peer_timeout: Option<Duration>,
}

impl NodeConfig {
    /// Parses flags, skipping the program name in `args[0]`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut port = DEFAULT_PORT;
        let mut host = DEFAULT_HOST.to_string();
        let mut api = false;
        let mut api_addr: SocketAddr = DEFAULT_API_ADDR.parse()?;
        let mut peers: Vec<String> = vec![];
        let mut cache_bytes = DEFAULT_CACHE_BYTES;
        let mut peer_timeout = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--api" => {
                    api = true;
                    i += 1;
                }
                flag @ ("--port" | "--host" | "--api-addr" | "--peer" | "--cache-bytes"
                | "--timeout-ms") => {
                    let Some(value) = args.get(i + 1) else {
                        bail!("{} requires a value", flag);
                    };
                    match flag {
                        "--port" => port = value.parse()?,
                        "--host" => host = value.clone(),
                        "--api-addr" => api_addr = value.parse()?,
                        "--peer" => peers.push(value.trim_end_matches('/').to_string()),
                        "--cache-bytes" => cache_bytes = value.parse()?,
                        _ => peer_timeout = Some(Duration::from_millis(value.parse()?)),
                    }
                    i += 2;
                }
                other => {
                    tracing::warn!("Ignoring unknown argument: {}", other);
                    i += 1;
                }
            }
        }

        if peers.is_empty() {
            peers = DEFAULT_PEER_PORTS
                .iter()
                .map(|p| format!("http://{}:{}", host, p))
                .collect();
        }

        let config = Self {
            port,
            host,
            api,
            api_addr,
            peers,
            cache_bytes,
            peer_timeout,
        };

        if !config.peers.contains(&config.self_addr()) {
            bail!(
                "this node ({}) must be listed among the peers: {:?}",
                config.self_addr(),
                config.peers
            );
        }

        Ok(config)
    }

    /// Address other peers use to reach this node.
    pub fn self_addr(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Socket the peer server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
