//! Hardware directory for network boot
//!
//! This crate provides the lookup contract the DHCP and ISO services use
//! to decide whether a machine is known to the inventory and how it
//! should boot. Directory results are read-only values fetched fresh
//! for every request.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Arc<dyn HardwareDirectory>             │
//! │   lookup_by_mac(MacAddr) / lookup_by_ip(Ipv4Addr)   │
//! └─────────────────────────────────────────────────────┘
//!          │                  │                  │
//!          ▼                  ▼                  ▼
//! ┌────────────────┐ ┌────────────────┐ ┌────────────────┐
//! │ MemoryDirectory│ │  FileDirectory │ │  NoopDirectory │
//! │  RwLock<Map>   │ │  YAML + reload │ │  always errors │
//! └────────────────┘ └────────────────┘ └────────────────┘
//!                             │
//!                             ▼
//!                  HardwareDocument ──► Hardware
//!                  (Tinkerbell shape)   (LeaseRecord + NetbootPolicy)
//! ```
//!
//! A lookup that finds nothing returns [`DirectoryError::NotFound`], which
//! callers treat as an expected outcome rather than a failure.

pub mod directory;
pub mod document;
pub mod error;
pub mod file;
pub mod mac;
pub mod record;

pub use directory::*;
pub use document::*;
pub use error::*;
pub use file::*;
pub use mac::*;
pub use record::*;
