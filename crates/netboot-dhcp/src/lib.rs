//! Netboot DHCP Server
//!
//! This crate provides a reservation-only DHCPv4 server for bare metal
//! provisioning. Addresses are never allocated from a pool: a client is
//! answered only when the hardware directory holds a record for its MAC,
//! and the reply carries exactly what that record says.
//!
//! Clients that identify as PXE or UEFI HTTP boot firmware additionally
//! get a boot file name chosen from the machine's netboot policy and the
//! architecture the firmware reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 DhcpServer                          │
//! │        UDP socket, one task per datagram            │
//! │                       │                             │
//! │                       ▼                             │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │            DhcpMessage codec                  │  │
//! │  │   dhcproto message + option 43 sub-options    │  │
//! │  └───────────────────────────────────────────────┘  │
//! │                       │                             │
//! │                       ▼                             │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │         ReservationHandler                    │  │
//! │  │   MAC → HardwareDirectory → OFFER / ACK       │  │
//! │  │              │                                │  │
//! │  │              ▼                                │  │
//! │  │   netboot::resolve → boot file, option 43     │  │
//! │  └───────────────────────────────────────────────┘  │
//! │                       │                             │
//! │                       ▼                             │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │         DhcpEvent Stream                      │  │
//! │  │   Offered | Acknowledged | Ignored | ...      │  │
//! │  └───────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use netboot_dhcp::{DhcpConfig, DhcpServer, NetbootConfig};
//! use netboot_hardware::MemoryDirectory;
//! use std::net::Ipv4Addr;
//! use std::sync::Arc;
//!
//! let config = DhcpConfig::new(Ipv4Addr::new(192, 168, 1, 1)).with_netboot(
//!     NetbootConfig::default().with_ipxe_script_url("http://192.168.1.1:8080/auto.ipxe".parse()?),
//! );
//!
//! let server = DhcpServer::new(config, Arc::new(MemoryDirectory::new()));
//! let (_tx, shutdown) = tokio::sync::watch::channel(false);
//! server.run(shutdown).await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod netboot;
pub mod reservation;
pub mod server;
pub mod vendor;

pub use codec::*;
pub use config::*;
pub use error::*;
pub use netboot::*;
pub use reservation::*;
pub use server::*;
pub use vendor::*;
