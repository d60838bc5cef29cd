//! Patched ISO streaming
//!
//! Serves boot images with a per-machine kernel command line written over
//! a fixed-length placeholder that was baked into the image at build time.
//! The image is never buffered: bytes flow from the upstream source to the
//! client through a small sliding window, and the output length always
//! matches the input so ISO9660 extents stay valid.
//!
//! # Architecture
//!
//! ```text
//! GET /iso/{mac}/{filename}[?iso=<url>]
//!                 │
//!                 ▼
//! ┌─────────────────────────────────────────────────────┐
//! │  handler: parse path → HardwareDirectory lookup     │
//! │  source = ?iso | hardware iso_url | default         │
//! └─────────────────────────────────────────────────────┘
//!          │                              │
//!          ▼                              ▼
//! ┌──────────────────────┐   ┌──────────────────────────┐
//! │ Fetcher              │   │ kernel_cmdline           │
//! │ reqwest, manual      │   │ facility, consoles, mac, │
//! │ redirects, Range     │   │ grpc, extras, ipam       │
//! └──────────────────────┘   └──────────────────────────┘
//!          │                              │
//!          └──────────────┬───────────────┘
//!                         ▼
//!          ┌─────────────────────────────┐
//!          │ patch_stream(MagicPatcher)  │
//!          │ carry magic.len() - 1 bytes │
//!          └─────────────────────────────┘
//!                         │
//!                         ▼
//!                  axum Body stream
//! ```
//!
//! # Example
//!
//! ```ignore
//! use netboot_iso::{router, serve, IsoConfig, IsoState, KernelParams};
//! use netboot_hardware::MemoryDirectory;
//! use std::sync::Arc;
//!
//! let config = IsoConfig::new(magic)
//!     .with_default_iso_url("http://mirror.local/hook.iso".parse()?)
//!     .with_kernel_params(KernelParams::new("10.0.0.1:42113"));
//! let state = IsoState::new(config, Arc::new(MemoryDirectory::new()))?;
//!
//! let (_tx, shutdown) = tokio::sync::watch::channel(false);
//! serve("0.0.0.0:7171".parse()?, router(state), shutdown).await?;
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod handler;
pub mod kernel;
pub mod patch;

pub use config::*;
pub use error::*;
pub use fetch::*;
pub use handler::*;
pub use kernel::*;
pub use patch::*;

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// Serve `router` on `addr` until `shutdown` flips to true
pub async fn serve(
    addr: SocketAddr,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| IsoError::BindFailed { addr, source })?;
    let local = listener.local_addr().map_err(IsoError::Serve)?;
    info!(addr = %local, "ISO server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(IsoError::Serve)?;

    info!(addr = %local, "ISO server stopped");
    Ok(())
}
