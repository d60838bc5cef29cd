//! Error types for the DHCP service
//!
//! Covers socket binding, packet decoding and encoding, and directory
//! lookups made while building a reply.

use netboot_hardware::DirectoryError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Error type for DHCP operations
#[derive(Debug, Error)]
pub enum DhcpError {
    /// Failed to bind to socket
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse DHCP packet
    #[error("failed to parse DHCP packet: {0}")]
    ParseError(String),

    /// Failed to encode DHCP packet
    #[error("failed to encode DHCP packet: {0}")]
    EncodeError(String),

    /// Socket send error
    #[error("failed to send packet: {0}")]
    SendError(#[from] std::io::Error),

    /// Hardware directory failed
    #[error("hardware lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Hardware directory did not answer in time
    #[error("hardware lookup timed out after {0:?}")]
    LookupTimeout(Duration),
}

impl DhcpError {
    pub(crate) fn truncated(what: &str) -> Self {
        DhcpError::ParseError(format!("truncated {what}"))
    }
}

/// Result type for DHCP operations
pub type Result<T> = std::result::Result<T, DhcpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_error_display() {
        let err = DhcpError::ParseError("packet too short".to_string());
        assert_eq!(err.to_string(), "failed to parse DHCP packet: packet too short");

        let err = DhcpError::truncated("option 53");
        assert_eq!(err.to_string(), "failed to parse DHCP packet: truncated option 53");

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 67);
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = DhcpError::BindFailed {
            addr,
            source: io_err,
        };
        assert!(err.to_string().contains("failed to bind"));

        let err = DhcpError::LookupTimeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "hardware lookup timed out after 5s");
    }

    #[test]
    fn test_directory_error_conversion() {
        let err: DhcpError = DirectoryError::Backend("down".to_string()).into();
        assert!(matches!(err, DhcpError::Directory(_)));
        assert_eq!(err.to_string(), "hardware lookup failed: backend error: down");
    }
}
