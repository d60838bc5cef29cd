//! `/iso/{mac}/{filename}` handler
//!
//! Resolves the source ISO for a machine, fetches it and streams it back
//! with the magic placeholder replaced by that machine's kernel command
//! line.

use crate::config::IsoConfig;
use crate::error::{IsoError, Result};
use crate::fetch::Fetcher;
use crate::kernel::kernel_cmdline;
use crate::patch::{patch_stream, MagicPatcher};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use netboot_hardware::{Hardware, HardwareDirectory, MacAddr};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Headers copied from the upstream response
const FORWARDED_HEADERS: [header::HeaderName; 5] = [
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::LAST_MODIFIED,
];

/// Shared state for the ISO routes
#[derive(Clone)]
pub struct IsoState {
    config: Arc<IsoConfig>,
    directory: Arc<dyn HardwareDirectory>,
    fetcher: Fetcher,
}

impl IsoState {
    pub fn new(config: IsoConfig, directory: Arc<dyn HardwareDirectory>) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            directory,
            fetcher,
        })
    }

    pub fn config(&self) -> &IsoConfig {
        &self.config
    }
}

impl std::fmt::Debug for IsoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsoState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IsoQuery {
    /// Explicit source URL, overriding everything else
    iso: Option<String>,
}

/// Router serving `GET`/`HEAD /iso/{mac}/{filename}`
pub fn router(state: IsoState) -> Router {
    Router::new()
        .route("/iso/{*path}", get(serve_iso))
        .with_state(state)
}

async fn serve_iso(
    State(state): State<IsoState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<IsoQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let (mac, filename) = parse_iso_path(&path)?;
    let override_url = query
        .iso
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_source_url)
        .transpose()?;

    let hardware = match lookup(&state, &mac).await {
        Ok(hardware) => hardware,
        Err(e) => {
            if let Some(url) = &override_url {
                warn!(
                    mac = %mac,
                    source = %url,
                    error = %e,
                    "Hardware lookup failed for request with explicit ISO source"
                );
            }
            return Err(e);
        }
    };
    let source = resolve_source(
        override_url,
        hardware.as_ref(),
        state.config.default_iso_url.as_ref(),
    )?;

    let cmdline = kernel_cmdline(
        &state.config.kernel,
        state.config.static_ipam,
        mac,
        hardware.as_ref(),
    );
    let patcher = MagicPatcher::new(state.config.magic.as_bytes(), &cmdline)?;

    info!(mac = %mac, filename = %filename, source = %source, method = %method, "Serving patched ISO");
    debug!(mac = %mac, cmdline = %cmdline, "Kernel command line");

    let upstream_method = if method == Method::HEAD {
        Method::HEAD
    } else {
        Method::GET
    };
    let upstream = state
        .fetcher
        .fetch(upstream_method, source, headers.get(header::RANGE))
        .await?;

    let mut builder = Response::builder().status(upstream.status());
    for name in FORWARDED_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            builder = builder.header(name, value.clone());
        }
    }

    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        let stream = Box::pin(upstream.bytes_stream());
        Body::from_stream(patch_stream(stream, patcher, state.config.idle_timeout))
    };

    builder
        .body(body)
        .map_err(|e| IsoError::Stream(format!("failed to build response: {e}")))
}

/// Split `{mac}/{filename}`, both segments non-empty
fn parse_iso_path(path: &str) -> Result<(MacAddr, &str)> {
    let invalid = || IsoError::InvalidPath(format!("/iso/{path}"));
    let mut segments = path.split('/');
    let (mac, filename) = match (segments.next(), segments.next(), segments.next()) {
        (Some(mac), Some(filename), None) if !mac.is_empty() && !filename.is_empty() => {
            (mac, filename)
        }
        _ => return Err(invalid()),
    };
    let mac = mac
        .parse::<MacAddr>()
        .map_err(|_| IsoError::InvalidMac(mac.to_string()))?;
    Ok((mac, filename))
}

fn parse_source_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| IsoError::InvalidSourceUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Query override, then the machine's own ISO, then the default
fn resolve_source(
    override_url: Option<Url>,
    hardware: Option<&Hardware>,
    default_url: Option<&Url>,
) -> Result<Url> {
    override_url
        .or_else(|| hardware.and_then(|hw| hw.netboot.iso_url.clone()))
        .or_else(|| default_url.cloned())
        .ok_or(IsoError::NoSource)
}

/// Hardware for `mac`; an unknown machine is not an error here
async fn lookup(state: &IsoState, mac: &MacAddr) -> Result<Option<Hardware>> {
    let timeout = state.config.lookup_timeout;
    let result = tokio::time::timeout(timeout, state.directory.lookup_by_mac(mac))
        .await
        .map_err(|_| IsoError::LookupTimeout(timeout))?;
    match result {
        Ok(hw) => Ok(Some(hw)),
        Err(e) if e.is_not_found() => {
            debug!(mac = %mac, "No hardware record, using fixed kernel parameters");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
