//! Connection URL parsing.
//!
//! Accepted forms:
//!
//! - `tcp://[server_host][:server_port]` (default `127.0.0.1:5760`)
//! - `udp://[bind_host][:bind_port]` (default `0.0.0.0:14540`)
//! - `serial:///path/to/serial/dev[:baudrate]` (default 57600 baud)
//!
//! [`crate::link::transport::open`] turns each form into a transport.

use core::fmt;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";
pub const DEFAULT_TCP_PORT: u16 = 5760;
pub const DEFAULT_UDP_HOST: &str = "0.0.0.0";
pub const DEFAULT_UDP_PORT: u16 = 14540;
pub const DEFAULT_SERIAL_BAUD: u32 = 57600;

/// Parsed connection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionUrl {
    /// Connect out to a TCP server
    Tcp { host: String, port: u16 },
    /// Listen for UDP datagrams on a local address
    Udp { host: String, port: u16 },
    /// Serial device
    Serial { path: String, baud: u32 },
}

impl FromStr for ConnectionUrl {
    type Err = AppError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidUrl(url.to_string());

        if let Some(rest) = url.strip_prefix("tcp://") {
            let (host, port) = split_host_port(rest, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
                .ok_or_else(invalid)?;
            Ok(ConnectionUrl::Tcp { host, port })
        } else if let Some(rest) = url.strip_prefix("udp://") {
            let (host, port) = split_host_port(rest, DEFAULT_UDP_HOST, DEFAULT_UDP_PORT)
                .ok_or_else(invalid)?;
            Ok(ConnectionUrl::Udp { host, port })
        } else if let Some(rest) = url.strip_prefix("serial://") {
            let (path, baud) = split_path_baud(rest).ok_or_else(invalid)?;
            Ok(ConnectionUrl::Serial { path, baud })
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionUrl::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            ConnectionUrl::Udp { host, port } => write!(f, "udp://{host}:{port}"),
            ConnectionUrl::Serial { path, baud } => write!(f, "serial://{path}:{baud}"),
        }
    }
}

fn split_host_port(rest: &str, default_host: &str, default_port: u16) -> Option<(String, u16)> {
    let (host, port) = match rest.rsplit_once(':') {
        Some((host, "")) => (host, default_port),
        Some((host, port)) => (host, port.parse().ok()?),
        None => (rest, default_port),
    };
    if host.contains('/') {
        return None;
    }
    let host = if host.is_empty() { default_host } else { host };
    Some((host.to_string(), port))
}

fn split_path_baud(rest: &str) -> Option<(String, u32)> {
    if !rest.starts_with('/') {
        return None;
    }
    let (path, baud) = match rest.rsplit_once(':') {
        Some((path, baud)) => (path, baud.parse().ok()?),
        None => (rest, DEFAULT_SERIAL_BAUD),
    };
    if path.len() < 2 {
        return None;
    }
    Some((path.to_string(), baud))
}
