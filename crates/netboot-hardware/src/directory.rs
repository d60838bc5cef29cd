//! Directory contract and in-process backends

use crate::error::{DirectoryError, Result};
use crate::mac::MacAddr;
use crate::record::Hardware;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::RwLock;

/// Source of per-machine lease and netboot facts
///
/// Implementations own their concurrency; callers hold them as
/// `Arc<dyn HardwareDirectory>` and may look up from many tasks at once.
/// A miss must be reported as [`DirectoryError::NotFound`] so it can be
/// told apart from backend failures.
#[async_trait]
pub trait HardwareDirectory: Send + Sync {
    /// Look up hardware by the MAC of one of its interfaces
    async fn lookup_by_mac(&self, mac: &MacAddr) -> Result<Hardware>;

    /// Look up hardware by an assigned IPv4 address
    async fn lookup_by_ip(&self, ip: Ipv4Addr) -> Result<Hardware>;
}

/// Directory held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    hardware: RwLock<HashMap<MacAddr, Hardware>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record keyed by its lease MAC
    pub fn insert(&self, hardware: Hardware) {
        let mut map = self.hardware.write().unwrap_or_else(|e| e.into_inner());
        map.insert(hardware.mac(), hardware);
    }

    pub fn remove(&self, mac: &MacAddr) -> Option<Hardware> {
        let mut map = self.hardware.write().unwrap_or_else(|e| e.into_inner());
        map.remove(mac)
    }

    pub fn len(&self) -> usize {
        self.hardware.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Hardware> for MemoryDirectory {
    fn from_iter<I: IntoIterator<Item = Hardware>>(iter: I) -> Self {
        let dir = MemoryDirectory::new();
        for hw in iter {
            dir.insert(hw);
        }
        dir
    }
}

#[async_trait]
impl HardwareDirectory for MemoryDirectory {
    async fn lookup_by_mac(&self, mac: &MacAddr) -> Result<Hardware> {
        let map = self.hardware.read().unwrap_or_else(|e| e.into_inner());
        map.get(mac)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(mac.to_string()))
    }

    async fn lookup_by_ip(&self, ip: Ipv4Addr) -> Result<Hardware> {
        let map = self.hardware.read().unwrap_or_else(|e| e.into_inner());
        map.values()
            .find(|hw| hw.lease.ip == ip)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(ip.to_string()))
    }
}

/// Directory used when no backend is configured; every lookup fails
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDirectory;

#[async_trait]
impl HardwareDirectory for NoopDirectory {
    async fn lookup_by_mac(&self, _mac: &MacAddr) -> Result<Hardware> {
        Err(DirectoryError::Backend("no backend configured".to_string()))
    }

    async fn lookup_by_ip(&self, _ip: Ipv4Addr) -> Result<Hardware> {
        Err(DirectoryError::Backend("no backend configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LeaseRecord, NetbootPolicy};

    fn hardware(last: u8) -> Hardware {
        Hardware::new(
            LeaseRecord::new(
                MacAddr::new([0, 0x11, 0x22, 0x33, 0x44, last]),
                Ipv4Addr::new(192, 168, 1, last),
                Ipv4Addr::new(255, 255, 255, 0),
            ),
            NetbootPolicy::allowed(),
        )
    }

    #[tokio::test]
    async fn test_memory_lookup() {
        let dir: MemoryDirectory = [hardware(10), hardware(11)].into_iter().collect();
        assert_eq!(dir.len(), 2);

        let mac: MacAddr = "00:11:22:33:44:0A".parse().unwrap();
        let found = dir.lookup_by_mac(&mac).await.unwrap();
        assert_eq!(found.lease.ip, Ipv4Addr::new(192, 168, 1, 10));

        let found = dir.lookup_by_ip(Ipv4Addr::new(192, 168, 1, 11)).await.unwrap();
        assert_eq!(found.mac().octets()[5], 11);

        let err = dir.lookup_by_mac(&MacAddr::new([0xff; 6])).await.unwrap_err();
        assert!(err.is_not_found());
        let err = dir.lookup_by_ip(Ipv4Addr::new(10, 0, 0, 1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_memory_remove() {
        let dir = MemoryDirectory::new();
        dir.insert(hardware(10));
        assert!(dir.remove(&hardware(10).mac()).is_some());
        assert!(dir.is_empty());
    }

    #[tokio::test]
    async fn test_noop_always_errors() {
        let dir = NoopDirectory;
        let err = dir.lookup_by_mac(&MacAddr::new([1; 6])).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(dir.lookup_by_ip(Ipv4Addr::LOCALHOST).await.is_err());
    }
}
