//! SSH reachability probe.
//!
//! A host counts as reachable once it completes the identification exchange
//! from RFC 4253 §4.2: we connect, wait for the server's `SSH-` version line,
//! answer with our own and hang up. No key exchange, no authentication.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use sshcheck_common::probe::ProbeOutcome;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::{Instant, timeout};
use tracing::trace;

pub const CLIENT_IDENT: &str = concat!("SSH-2.0-sshcheck_", env!("CARGO_PKG_VERSION"));

/// RFC 4253 caps the identification line at 255 bytes including CR LF.
const MAX_LINE_LEN: u64 = 255;
/// Servers may send other lines before the version string.
const MAX_PRE_BANNER_LINES: usize = 32;
const MAX_PREVIEW_LEN: usize = 64;

/// Everything that can make a probe fail. Only ever surfaced as text.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} did not resolve to any address")]
    NoAddress(String),
    #[error("connection refused")]
    Refused,
    #[error("timed out after {:.1}s", .0.as_secs_f64())]
    TimedOut(Duration),
    #[error("connection closed before SSH identification")]
    Closed,
    #[error("not an SSH server, received: {0:?}")]
    ProtocolMismatch(String),
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Checks whether an SSH server answers on `hostname:port`.
///
/// Never fails: every error becomes [`ProbeOutcome::Unreachable`] with a
/// readable reason. `probe_timeout` bounds the whole exchange.
pub async fn probe(hostname: &str, port: u16, probe_timeout: Duration) -> ProbeOutcome {
    let result = match timeout(probe_timeout, handshake(hostname, port, probe_timeout)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(ProbeError::TimedOut(probe_timeout)),
    };

    match result {
        Ok(banner) => ProbeOutcome::Reachable { banner },
        Err(e) => ProbeOutcome::Unreachable {
            reason: e.to_string(),
        },
    }
}

async fn handshake(hostname: &str, port: u16, budget: Duration) -> Result<String, ProbeError> {
    let mut stream: TcpStream = connect(hostname, port, budget).await?;
    let (read_half, mut write_half) = stream.split();

    let mut reader = BufReader::new(read_half);
    let banner: String = read_identification(&mut reader).await?;

    // The exchange already succeeded; the server hanging up on us is fine.
    let _ = write_half
        .write_all(format!("{CLIENT_IDENT}\r\n").as_bytes())
        .await;
    let _ = write_half.shutdown().await;

    Ok(banner)
}

async fn connect(hostname: &str, port: u16, budget: Duration) -> Result<TcpStream, ProbeError> {
    let addrs: Vec<SocketAddr> = lookup_host((hostname, port))
        .await
        .map_err(|source| ProbeError::Resolve {
            host: hostname.to_string(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ProbeError::NoAddress(hostname.to_string()));
    }
    connect_any(&addrs, budget).await
}

/// Tries `addrs` in order. Each address gets an equal share of what is left
/// of `budget`, so one blackholed address cannot starve the rest.
async fn connect_any(addrs: &[SocketAddr], budget: Duration) -> Result<TcpStream, ProbeError> {
    let deadline: Instant = Instant::now() + budget;
    let mut last_error: Option<ProbeError> = None;

    for (idx, addr) in addrs.iter().enumerate() {
        let left: u32 = u32::try_from(addrs.len() - idx).unwrap_or(u32::MAX);
        let slice: Duration = deadline.saturating_duration_since(Instant::now()) / left;

        match timeout(slice, TcpStream::connect(*addr)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                last_error = Some(ProbeError::Refused)
            }
            Ok(Err(e)) => last_error = Some(ProbeError::Io(e)),
            Err(_elapsed) => {
                trace!("Connect to {addr} gave up after {slice:?}");
                last_error = Some(ProbeError::TimedOut(budget))
            }
        }
    }

    Err(last_error.unwrap_or(ProbeError::TimedOut(budget)))
}

/// Reads lines until the server's `SSH-` identification string shows up.
async fn read_identification<R>(reader: &mut R) -> Result<String, ProbeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut first_line: Option<String> = None;

    for _ in 0..MAX_PRE_BANNER_LINES {
        let mut buf: Vec<u8> = Vec::with_capacity(MAX_LINE_LEN as usize);
        let read = (&mut *reader)
            .take(MAX_LINE_LEN)
            .read_until(b'\n', &mut buf)
            .await?;

        if read == 0 {
            return Err(match first_line {
                Some(line) => ProbeError::ProtocolMismatch(line),
                None => ProbeError::Closed,
            });
        }

        let line: String = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();

        if line.starts_with("SSH-") {
            return Ok(line);
        }

        if !buf.ends_with(b"\n") {
            return Err(ProbeError::ProtocolMismatch(preview(&line)));
        }

        first_line.get_or_insert_with(|| preview(&line));
    }

    Err(ProbeError::ProtocolMismatch(first_line.unwrap_or_default()))
}

fn preview(line: &str) -> String {
    line.chars().take(MAX_PREVIEW_LEN).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn serve_once(greeting: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket.write_all(greeting).await;
                let mut sink = Vec::new();
                let _ = socket.read_to_end(&mut sink).await;
            }
        });
        addr
    }

    /// TEST-NET-1 (RFC 5737) is never routed, so connects to it stall or fail.
    const UNROUTABLE: &str = "192.0.2.1:22";

    #[tokio::test]
    async fn stalled_address_leaves_budget_for_the_next() {
        let live = serve_once(b"SSH-2.0-OpenSSH_9.6\r\n").await;
        let addrs = [UNROUTABLE.parse().unwrap(), live];

        let started = Instant::now();
        let stream = connect_any(&addrs, Duration::from_secs(2)).await;

        assert!(stream.is_ok(), "second address was not tried: {stream:?}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn all_addresses_refusing_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed = listener.local_addr().unwrap();
        drop(listener);

        let result = connect_any(&[closed, closed], Duration::from_secs(2)).await;
        assert!(matches!(result, Err(ProbeError::Refused)));
    }

    #[tokio::test]
    async fn identification_after_preamble_lines() {
        let mut input: &[u8] = b"Welcome\r\nauthorized use only\r\nSSH-2.0-OpenSSH_9.6\r\n";
        let banner = read_identification(&mut input).await.unwrap();
        assert_eq!(banner, "SSH-2.0-OpenSSH_9.6");
    }

    #[tokio::test]
    async fn empty_stream_is_closed() {
        let mut input: &[u8] = b"";
        assert!(matches!(
            read_identification(&mut input).await,
            Err(ProbeError::Closed)
        ));
    }

    #[tokio::test]
    async fn other_protocol_is_a_mismatch() {
        let mut input: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n";
        match read_identification(&mut input).await {
            Err(ProbeError::ProtocolMismatch(line)) => assert_eq!(line, "HTTP/1.1 400 Bad Request"),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn overlong_line_is_a_mismatch() {
        let long = vec![b'x'; 1024];
        let mut input: &[u8] = &long;
        assert!(matches!(
            read_identification(&mut input).await,
            Err(ProbeError::ProtocolMismatch(_))
        ));
    }

    #[tokio::test]
    async fn probe_reaches_local_ssh_listener() {
        let addr = serve_once(b"SSH-2.0-MockSSH\r\n").await;
        let outcome = probe("127.0.0.1", addr.port(), Duration::from_secs(2)).await;
        assert_eq!(
            outcome,
            ProbeOutcome::Reachable {
                banner: "SSH-2.0-MockSSH".into()
            }
        );
    }

    #[tokio::test]
    async fn probe_reports_refused_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = probe("127.0.0.1", port, Duration::from_secs(2)).await;
        assert_eq!(
            outcome,
            ProbeOutcome::Unreachable {
                reason: "connection refused".into()
            }
        );
    }

    #[tokio::test]
    async fn probe_times_out_on_silent_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let outcome = probe("127.0.0.1", port, Duration::from_millis(200)).await;
        match outcome {
            ProbeOutcome::Unreachable { reason } => assert!(reason.starts_with("timed out")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_never_fails_on_bad_hostname() {
        let outcome = probe("host.invalid", 22, Duration::from_secs(2)).await;
        assert!(!outcome.is_reachable());
    }
}
