//! TCP reachability probe run before opening an SSH session.
//!
//! The probe only checks that something accepts connections on the SSH
//! port. Failure reasons are mapped to distinct messages so an administrator
//! can tell a powered-off router from a wrong address.

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use crate::unblock::error::UnblockError;

/// Attempt a bare TCP connection to `host:port` within `timeout`.
///
/// # Errors
///
/// Returns [`UnblockError::NetworkUnreachable`] with a reason describing
/// whether the connection was refused, the host or network was unreachable,
/// or the attempt timed out.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> Result<(), UnblockError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            debug!("Probe succeeded for {}:{}", host, port);
            drop(stream);
            Ok(())
        }
        Ok(Err(e)) => Err(UnblockError::NetworkUnreachable {
            reason: describe_io_error(host, port, &e),
        }),
        Err(_) => Err(UnblockError::NetworkUnreachable {
            reason: format!(
                "{}:{} did not answer within {:?} (router powered off or wrong address?)",
                host, port, timeout
            ),
        }),
    }
}

fn describe_io_error(host: &str, port: u16, err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => format!(
            "connection refused by {}:{} (SSH service not running on the router?)",
            host, port
        ),
        io::ErrorKind::HostUnreachable => format!("host {} is unreachable", host),
        io::ErrorKind::NetworkUnreachable => format!("network unreachable for {}", host),
        _ => format!("cannot connect to {}:{}: {}", host, port, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_succeeds_against_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let result = probe("127.0.0.1", port, Duration::from_secs(2)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_refused_on_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = probe("127.0.0.1", port, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, UnblockError::NetworkUnreachable { .. }));
        assert!(err.to_string().contains("refused"));
    }

    #[tokio::test]
    async fn test_probe_times_out_on_non_routable_address() {
        let err = probe("10.255.255.1", 22, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, UnblockError::NetworkUnreachable { .. }));
    }

    #[test]
    fn test_describe_distinguishes_reasons() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        let host = io::Error::from(io::ErrorKind::HostUnreachable);
        let net = io::Error::from(io::ErrorKind::NetworkUnreachable);

        let a = describe_io_error("192.168.1.1", 22, &refused);
        let b = describe_io_error("192.168.1.1", 22, &host);
        let c = describe_io_error("192.168.1.1", 22, &net);

        assert!(a.contains("refused"));
        assert!(b.contains("host 192.168.1.1 is unreachable"));
        assert!(c.contains("network unreachable"));
    }
}
