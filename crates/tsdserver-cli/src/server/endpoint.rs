//! Listen endpoint URIs.
//!
//! | URI                       | endpoint                         |
//! |---------------------------|----------------------------------|
//! | `tcp://host[:port]`       | TCP socket, port defaults to 3000 |
//! | `tcp://[::1]:8080`        | TCP over IPv6                    |
//! | `unix:/path/to.sock`      | Unix domain socket               |
//! | `pipe:\\.\pipe\name`      | Windows named pipe               |

use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenEndpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
    Pipe(String),
}

impl fmt::Display for ListenEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenEndpoint::Tcp { host, port } if host.contains(':') => {
                write!(f, "tcp://[{host}]:{port}")
            }
            ListenEndpoint::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            ListenEndpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            ListenEndpoint::Pipe(name) => write!(f, "pipe:{name}"),
        }
    }
}

impl ListenEndpoint {
    /// `host:port` form accepted by `TcpListener::bind`.
    pub fn socket_address(&self) -> Option<String> {
        match self {
            ListenEndpoint::Tcp { host, port } if host.contains(':') => {
                Some(format!("[{host}]:{port}"))
            }
            ListenEndpoint::Tcp { host, port } => Some(format!("{host}:{port}")),
            _ => None,
        }
    }
}

/// Parse a listen URI. Used as a clap value parser.
pub fn parse_endpoint(uri: &str) -> Result<ListenEndpoint, String> {
    let (scheme, rest) = uri
        .split_once(':')
        .ok_or_else(|| format!("missing scheme in '{uri}' (expected tcp://, unix: or pipe:)"))?;

    match scheme {
        "tcp" => {
            let authority = rest
                .strip_prefix("//")
                .ok_or_else(|| format!("expected tcp://host[:port], got '{uri}'"))?;
            parse_tcp(authority.trim_end_matches('/'))
        }
        "unix" => {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() {
                return Err("unix endpoint needs a socket path".to_string());
            }
            Ok(ListenEndpoint::Unix(PathBuf::from(path)))
        }
        "pipe" => {
            if rest.is_empty() {
                return Err("pipe endpoint needs a pipe name".to_string());
            }
            Ok(ListenEndpoint::Pipe(rest.to_string()))
        }
        other => Err(format!(
            "unsupported scheme '{other}' (expected tcp://, unix: or pipe:)"
        )),
    }
}

fn parse_tcp(authority: &str) -> Result<ListenEndpoint, String> {
    if authority.is_empty() {
        return Err("tcp endpoint needs a host".to_string());
    }

    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| format!("unterminated IPv6 address in '{authority}'"))?;
        let port = match after {
            "" => None,
            _ => Some(
                after
                    .strip_prefix(':')
                    .ok_or_else(|| format!("unexpected '{after}' after IPv6 address"))?,
            ),
        };
        (host, port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err("tcp endpoint needs a host".to_string());
    }

    let port = match port {
        Some(port) => port
            .parse::<u16>()
            .map_err(|_| format!("invalid port '{port}'"))?,
        None => DEFAULT_PORT,
    };

    Ok(ListenEndpoint::Tcp {
        host: host.to_string(),
        port,
    })
}
