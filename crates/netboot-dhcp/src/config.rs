//! DHCP server configuration
//!
//! This module provides configuration types for the reservation server
//! and the netboot settings used to pick a boot file.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use url::Url;

/// Standard TFTP port
pub const TFTP_PORT: u16 = 69;

/// Port servers and relay agents listen on
pub const SERVER_PORT: u16 = 67;

/// Port clients listen on
pub const CLIENT_PORT: u16 = 68;

/// Netboot settings shared by every reply
#[derive(Debug, Clone)]
pub struct NetbootConfig {
    /// Global switch; when false no boot file is ever advertised
    pub enabled: bool,

    /// iPXE script handed to clients already running the custom iPXE build
    pub ipxe_script_url: Option<Url>,

    /// Base URL serving iPXE binaries to UEFI HTTP boot clients
    pub ipxe_http_binary_url: Option<Url>,

    /// TFTP server for legacy PXE clients
    pub tftp_server: Option<SocketAddrV4>,
}

impl Default for NetbootConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ipxe_script_url: None,
            ipxe_http_binary_url: None,
            tftp_server: None,
        }
    }
}

impl NetbootConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_ipxe_script_url(mut self, url: Url) -> Self {
        self.ipxe_script_url = Some(url);
        self
    }

    pub fn with_ipxe_http_binary_url(mut self, url: Url) -> Self {
        self.ipxe_http_binary_url = Some(url);
        self
    }

    /// Set the TFTP server, defaulting the port to 69
    pub fn with_tftp_server(mut self, ip: Ipv4Addr) -> Self {
        self.tftp_server = Some(SocketAddrV4::new(ip, TFTP_PORT));
        self
    }

    pub fn with_tftp_addr(mut self, addr: SocketAddrV4) -> Self {
        self.tftp_server = Some(addr);
        self
    }
}

/// DHCP server configuration
#[derive(Debug, Clone)]
pub struct DhcpConfig {
    /// Address the UDP socket binds to
    pub bind_addr: SocketAddrV4,

    /// Server identifier (option 54); must be reachable by clients
    pub server_ip: Ipv4Addr,

    /// Upper bound on a single hardware directory lookup
    pub lookup_timeout: Duration,

    /// Destination port for replies sent straight to a client
    pub client_port: u16,

    /// Destination port for replies sent back through a relay agent
    pub relay_port: u16,

    /// Netboot settings
    pub netboot: NetbootConfig,
}

impl Default for DhcpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, SERVER_PORT),
            server_ip: Ipv4Addr::UNSPECIFIED,
            lookup_timeout: Duration::from_secs(5),
            client_port: CLIENT_PORT,
            relay_port: SERVER_PORT,
            netboot: NetbootConfig::default(),
        }
    }
}

impl DhcpConfig {
    /// Create a config that identifies as `server_ip` and binds to all
    /// interfaces on port 67. The TFTP server defaults to `server_ip`.
    pub fn new(server_ip: Ipv4Addr) -> Self {
        Self {
            server_ip,
            netboot: NetbootConfig::default().with_tftp_server(server_ip),
            ..Default::default()
        }
    }

    pub fn with_bind_addr(mut self, addr: SocketAddrV4) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_netboot(mut self, netboot: NetbootConfig) -> Self {
        self.netboot = netboot;
        self
    }

    pub fn with_reply_ports(mut self, client_port: u16, relay_port: u16) -> Self {
        self.client_port = client_port;
        self.relay_port = relay_port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dhcp_config_new() {
        let config = DhcpConfig::new(Ipv4Addr::new(192, 168, 1, 1));

        assert_eq!(config.server_ip, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(config.bind_addr, "0.0.0.0:67".parse().unwrap());
        assert_eq!(
            config.netboot.tftp_server,
            Some("192.168.1.1:69".parse().unwrap())
        );
        assert!(config.netboot.enabled);
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
        assert_eq!((config.client_port, config.relay_port), (68, 67));
    }

    #[test]
    fn test_dhcp_config_builder() {
        let netboot = NetbootConfig::default()
            .with_ipxe_script_url("http://10.0.0.1:8080/auto.ipxe".parse().unwrap())
            .with_ipxe_http_binary_url("http://10.0.0.1:8080/ipxe".parse().unwrap())
            .with_tftp_addr("10.0.0.1:6969".parse().unwrap());
        let config = DhcpConfig::new(Ipv4Addr::new(10, 0, 0, 1))
            .with_bind_addr("127.0.0.1:1067".parse().unwrap())
            .with_lookup_timeout(Duration::from_millis(250))
            .with_netboot(netboot);

        assert_eq!(config.bind_addr.port(), 1067);
        assert_eq!(config.lookup_timeout, Duration::from_millis(250));
        assert_eq!(config.netboot.tftp_server.map(|a| a.port()), Some(6969));
        assert!(config.netboot.ipxe_script_url.is_some());
    }

    #[test]
    fn test_netboot_disabled() {
        let netboot = NetbootConfig::disabled();
        assert!(!netboot.enabled);
    }
}
