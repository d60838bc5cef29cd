//! Lease and netboot facts returned by a directory lookup

use crate::mac::MacAddr;
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use url::Url;

/// Lease time used when a record does not specify one
pub const DEFAULT_LEASE_TIME: u32 = 86400;

/// RFC 3442 classless static route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClasslessRoute {
    pub destination: Ipv4Network,
    pub router: Ipv4Addr,
}

/// Address assignment for one machine interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRecord {
    /// Primary lookup key
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub gateway: Option<Ipv4Addr>,
    pub dns_servers: Vec<Ipv4Addr>,
    pub ntp_servers: Vec<Ipv4Addr>,
    pub hostname: Option<String>,
    pub domain_name: Option<String>,
    /// Derived from `ip` and `subnet_mask` unless overridden
    pub broadcast: Ipv4Addr,
    /// Seconds, always greater than zero
    pub lease_time: u32,
    /// Order is significant on the wire
    pub domain_search: Vec<String>,
    /// Numeric 0-4096 when present
    pub vlan_id: Option<String>,
    /// Order is significant on the wire
    pub classless_routes: Vec<ClasslessRoute>,
}

impl LeaseRecord {
    pub fn new(mac: MacAddr, ip: Ipv4Addr, subnet_mask: Ipv4Addr) -> Self {
        Self {
            mac,
            ip,
            subnet_mask,
            gateway: None,
            dns_servers: Vec::new(),
            ntp_servers: Vec::new(),
            hostname: None,
            domain_name: None,
            broadcast: broadcast_for(ip, subnet_mask),
            lease_time: DEFAULT_LEASE_TIME,
            domain_search: Vec::new(),
            vlan_id: None,
            classless_routes: Vec::new(),
        }
    }

    pub fn with_gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_dns_server(mut self, dns: Ipv4Addr) -> Self {
        self.dns_servers.push(dns);
        self
    }

    pub fn with_ntp_server(mut self, ntp: Ipv4Addr) -> Self {
        self.ntp_servers.push(ntp);
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_domain_name(mut self, domain: impl Into<String>) -> Self {
        self.domain_name = Some(domain.into());
        self
    }

    pub fn with_broadcast(mut self, broadcast: Ipv4Addr) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// A zero lease time falls back to [`DEFAULT_LEASE_TIME`]
    pub fn with_lease_time(mut self, seconds: u32) -> Self {
        self.lease_time = if seconds == 0 {
            DEFAULT_LEASE_TIME
        } else {
            seconds
        };
        self
    }

    pub fn with_search_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain_search.push(domain.into());
        self
    }

    pub fn with_vlan_id(mut self, vlan: impl Into<String>) -> Self {
        self.vlan_id = Some(vlan.into());
        self
    }

    pub fn with_route(mut self, destination: Ipv4Network, router: Ipv4Addr) -> Self {
        self.classless_routes.push(ClasslessRoute {
            destination,
            router,
        });
        self
    }
}

/// Per-machine network boot decision
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetbootPolicy {
    pub allow_netboot: bool,
    pub ipxe_script_url: Option<Url>,
    pub facility: Option<String>,
    /// Overrides the configured default ISO source
    pub iso_url: Option<Url>,
}

impl NetbootPolicy {
    pub fn allowed() -> Self {
        Self {
            allow_netboot: true,
            ..Default::default()
        }
    }

    pub fn with_ipxe_script_url(mut self, url: Url) -> Self {
        self.ipxe_script_url = Some(url);
        self
    }

    pub fn with_facility(mut self, facility: impl Into<String>) -> Self {
        self.facility = Some(facility.into());
        self
    }

    pub fn with_iso_url(mut self, url: Url) -> Self {
        self.iso_url = Some(url);
        self
    }
}

/// Result of a successful directory lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hardware {
    pub lease: LeaseRecord,
    pub netboot: NetbootPolicy,
}

impl Hardware {
    pub fn new(lease: LeaseRecord, netboot: NetbootPolicy) -> Self {
        Self { lease, netboot }
    }

    pub fn mac(&self) -> MacAddr {
        self.lease.mac
    }
}

/// Directed broadcast address of the subnet containing `ip`
pub fn broadcast_for(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}
