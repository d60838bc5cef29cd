//! ISO patcher configuration

use std::time::Duration;
use url::Url;

/// Default redirect hop limit
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Fixed kernel parameters shared by every machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelParams {
    /// Extra `key=value` parameters appended verbatim
    pub extra: Vec<String>,

    /// Remote syslog `host:port`
    pub syslog_host: Option<String>,

    /// Tinkerbell gRPC server `host:port`
    pub grpc_authority: String,

    /// Whether the gRPC server uses TLS
    pub tls: bool,
}

impl KernelParams {
    pub fn new(grpc_authority: impl Into<String>) -> Self {
        Self {
            grpc_authority: grpc_authority.into(),
            ..Default::default()
        }
    }

    pub fn with_extra(mut self, param: impl Into<String>) -> Self {
        self.extra.push(param.into());
        self
    }

    pub fn with_syslog_host(mut self, host: impl Into<String>) -> Self {
        self.syslog_host = Some(host.into());
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// ISO patcher configuration
#[derive(Debug, Clone)]
pub struct IsoConfig {
    /// Source used when neither the request nor the hardware names one
    pub default_iso_url: Option<Url>,

    /// Placeholder baked into the image at build time
    pub magic: String,

    pub kernel: KernelParams,

    /// Append an `ipam=` parameter built from the lease
    pub static_ipam: bool,

    pub max_redirects: usize,

    /// TCP connect timeout for upstream requests
    pub connect_timeout: Duration,

    /// Time allowed for upstream response headers, per hop
    pub header_timeout: Duration,

    /// Longest gap allowed between body chunks
    pub idle_timeout: Duration,

    /// Upper bound on a hardware directory lookup
    pub lookup_timeout: Duration,
}

impl IsoConfig {
    pub fn new(magic: impl Into<String>) -> Self {
        Self {
            default_iso_url: None,
            magic: magic.into(),
            kernel: KernelParams::default(),
            static_ipam: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout: Duration::from_secs(10),
            header_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            lookup_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_default_iso_url(mut self, url: Url) -> Self {
        self.default_iso_url = Some(url);
        self
    }

    pub fn with_kernel_params(mut self, kernel: KernelParams) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_static_ipam(mut self, enabled: bool) -> Self {
        self.static_ipam = enabled;
        self
    }

    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}
