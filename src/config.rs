//! Command-line and environment configuration

use clap::Parser;
use netboot_dhcp::{DhcpConfig, NetbootConfig};
use netboot_iso::{IsoConfig, KernelParams, DEFAULT_MAX_REDIRECTS};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Network boot: reservation DHCP and patched ISO streaming", long_about = None)]
pub struct Cli {
    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Address this host answers DHCP from; also the default TFTP server
    #[arg(long, env = "NETBOOT_SERVER_IP")]
    pub server_ip: Ipv4Addr,

    /// UDP address for the DHCP listener
    #[arg(long, env = "NETBOOT_DHCP_BIND", default_value = "0.0.0.0:67")]
    pub dhcp_bind: SocketAddrV4,

    /// Do not start the DHCP server
    #[arg(long, env = "NETBOOT_DHCP_DISABLED", default_value_t = false)]
    pub dhcp_disabled: bool,

    /// Answer DHCP without any netboot options
    #[arg(long, env = "NETBOOT_NETBOOT_DISABLED", default_value_t = false)]
    pub netboot_disabled: bool,

    /// iPXE script handed to clients with the Tinkerbell user class
    #[arg(long, env = "NETBOOT_IPXE_SCRIPT_URL")]
    pub ipxe_script_url: Option<Url>,

    /// Base URL serving iPXE binaries to UEFI HTTP boot clients
    #[arg(long, env = "NETBOOT_IPXE_HTTP_BINARY_URL")]
    pub ipxe_http_binary_url: Option<Url>,

    /// TFTP server for iPXE binaries; defaults to server-ip:69
    #[arg(long, env = "NETBOOT_TFTP_ADDR")]
    pub tftp_addr: Option<SocketAddrV4>,

    /// YAML file of hardware documents
    #[arg(long, env = "NETBOOT_HARDWARE_FILE")]
    pub hardware_file: Option<PathBuf>,

    /// How often to check the hardware file for changes, in seconds
    #[arg(long, env = "NETBOOT_HARDWARE_WATCH_SECS", default_value_t = 5)]
    pub hardware_watch_secs: u64,

    /// Upper bound on a hardware lookup, in seconds
    #[arg(long, env = "NETBOOT_LOOKUP_TIMEOUT_SECS", default_value_t = 5)]
    pub lookup_timeout_secs: u64,

    /// TCP address for the ISO server
    #[arg(long, env = "NETBOOT_ISO_BIND", default_value = "0.0.0.0:7171")]
    pub iso_bind: SocketAddr,

    /// Do not start the ISO server
    #[arg(long, env = "NETBOOT_ISO_DISABLED", default_value_t = false)]
    pub iso_disabled: bool,

    /// Source ISO used when neither the request nor the hardware names one
    #[arg(long, env = "NETBOOT_ISO_URL")]
    pub iso_url: Option<Url>,

    /// Placeholder baked into the ISO that receives the kernel command line
    #[arg(long, env = "NETBOOT_ISO_MAGIC", default_value = "")]
    pub iso_magic: String,

    /// Extra kernel parameter, repeatable
    #[arg(long = "kernel-param", env = "NETBOOT_KERNEL_PARAMS", value_delimiter = ' ')]
    pub kernel_params: Vec<String>,

    /// Remote syslog host:port passed to the booted kernel
    #[arg(long, env = "NETBOOT_SYSLOG_HOST")]
    pub syslog_host: Option<String>,

    /// Tinkerbell gRPC server host:port passed to the booted kernel
    #[arg(long, env = "NETBOOT_GRPC_AUTHORITY", default_value = "")]
    pub grpc_authority: String,

    /// Whether the gRPC server uses TLS
    #[arg(long, env = "NETBOOT_TLS", default_value_t = false)]
    pub tls: bool,

    /// Append static network settings from the lease to the kernel command line
    #[arg(long, env = "NETBOOT_STATIC_IPAM", default_value_t = false)]
    pub static_ipam: bool,

    /// Redirect hops followed when fetching a source ISO
    #[arg(long, env = "NETBOOT_ISO_MAX_REDIRECTS", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub iso_max_redirects: usize,

    /// Longest gap between upstream body chunks, in seconds
    #[arg(long, env = "NETBOOT_ISO_IDLE_TIMEOUT_SECS", default_value_t = 60)]
    pub iso_idle_timeout_secs: u64,
}

impl Cli {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn hardware_watch_interval(&self) -> Duration {
        Duration::from_secs(self.hardware_watch_secs.max(1))
    }

    pub fn dhcp_config(&self) -> DhcpConfig {
        let mut netboot = if self.netboot_disabled {
            NetbootConfig::disabled()
        } else {
            NetbootConfig::default()
        };
        if let Some(url) = &self.ipxe_script_url {
            netboot = netboot.with_ipxe_script_url(url.clone());
        }
        if let Some(url) = &self.ipxe_http_binary_url {
            netboot = netboot.with_ipxe_http_binary_url(url.clone());
        }
        netboot = match self.tftp_addr {
            Some(addr) => netboot.with_tftp_addr(addr),
            None => netboot.with_tftp_server(self.server_ip),
        };

        DhcpConfig::new(self.server_ip)
            .with_bind_addr(self.dhcp_bind)
            .with_lookup_timeout(self.lookup_timeout())
            .with_netboot(netboot)
    }

    pub fn iso_config(&self) -> IsoConfig {
        let mut kernel = KernelParams::new(self.grpc_authority.clone()).with_tls(self.tls);
        if let Some(host) = &self.syslog_host {
            kernel = kernel.with_syslog_host(host.clone());
        }
        for param in self.kernel_params.iter().filter(|p| !p.is_empty()) {
            kernel = kernel.with_extra(param.clone());
        }

        let mut config = IsoConfig::new(self.iso_magic.clone())
            .with_kernel_params(kernel)
            .with_static_ipam(self.static_ipam)
            .with_max_redirects(self.iso_max_redirects)
            .with_idle_timeout(Duration::from_secs(self.iso_idle_timeout_secs))
            .with_lookup_timeout(self.lookup_timeout());
        if let Some(url) = &self.iso_url {
            config = config.with_default_iso_url(url.clone());
        }
        config
    }
}
