//! YAML file backed directory
//!
//! The file holds a YAML list of [`HardwareDocument`]s. It is parsed on
//! open and re-parsed whenever its modification time changes; a reload
//! that fails keeps serving the previous snapshot.

use crate::directory::HardwareDirectory;
use crate::document::HardwareDocument;
use crate::error::{DirectoryError, Result};
use crate::mac::MacAddr;
use crate::record::Hardware;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Snapshot {
    documents: Arc<Vec<HardwareDocument>>,
    modified: Option<SystemTime>,
}

/// Directory backed by a YAML inventory file
#[derive(Debug)]
pub struct FileDirectory {
    path: PathBuf,
    snapshot: RwLock<Snapshot>,
}

impl FileDirectory {
    /// Read and parse `path`; fails if the initial contents are unusable
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let dir = Self {
            path: path.as_ref().to_path_buf(),
            snapshot: RwLock::new(Snapshot::default()),
        };
        dir.reload().await?;
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents in the current snapshot
    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-read the file if its modification time moved. Returns whether
    /// a new snapshot was installed.
    pub async fn reload(&self) -> Result<bool> {
        let io_err = |source| DirectoryError::Io {
            path: self.path.clone(),
            source,
        };

        let modified = tokio::fs::metadata(&self.path)
            .await
            .map_err(io_err)?
            .modified()
            .ok();
        {
            let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
            if modified.is_some() && snapshot.modified == modified {
                return Ok(false);
            }
        }

        let raw = tokio::fs::read(&self.path).await.map_err(io_err)?;
        let documents = parse_documents(&raw)?;
        debug!(path = %self.path.display(), count = documents.len(), "Loaded hardware documents");

        let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *snapshot = Snapshot {
            documents: Arc::new(documents),
            modified,
        };
        Ok(true)
    }

    /// Poll the file every `interval` until `shutdown` flips to true
    pub fn spawn_watcher(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let dir = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match dir.reload().await {
                            Ok(true) => info!(path = %dir.path.display(), "Hardware file changed, reloaded"),
                            Ok(false) => {}
                            Err(e) => warn!(path = %dir.path.display(), error = %e, "Failed to reload hardware file, keeping previous contents"),
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!(path = %dir.path.display(), "Stopping hardware file watcher");
                            break;
                        }
                    }
                }
            }
        })
    }

    fn documents(&self) -> Arc<Vec<HardwareDocument>> {
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&snapshot.documents)
    }
}

fn parse_documents(raw: &[u8]) -> Result<Vec<HardwareDocument>> {
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_slice(raw)?)
}

#[async_trait]
impl HardwareDirectory for FileDirectory {
    async fn lookup_by_mac(&self, mac: &MacAddr) -> Result<Hardware> {
        let documents = self.documents();
        for doc in documents.iter() {
            if let Some(index) = doc.interface_for_mac(mac) {
                return doc.to_hardware(index);
            }
        }
        Err(DirectoryError::NotFound(mac.to_string()))
    }

    async fn lookup_by_ip(&self, ip: Ipv4Addr) -> Result<Hardware> {
        let documents = self.documents();
        for doc in documents.iter() {
            if let Some(index) = doc.interface_for_ip(ip) {
                return doc.to_hardware(index);
            }
        }
        Err(DirectoryError::NotFound(ip.to_string()))
    }
}
