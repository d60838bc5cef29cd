//! Tinkerbell-compatible hardware documents
//!
//! These mirror the field names of Tinkerbell's Hardware resource
//! (`tinkerbell.org/v1alpha1`) so existing inventories can be loaded
//! as-is. Each document is converted into [`Hardware`] per interface,
//! validating the fields a DHCP reply depends on.

use crate::error::{DirectoryError, Result};
use crate::mac::MacAddr;
use crate::record::{Hardware, LeaseRecord, NetbootPolicy};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use tracing::debug;
use url::Url;

/// Highest VLAN ID accepted in `vlan_id`
pub const MAX_VLAN_ID: u16 = 4096;

/// Hardware resource as stored in an inventory file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDocument {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: HardwareSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HardwareSpec {
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HardwareMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InterfaceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<DhcpSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub netboot: Option<NetbootSpec>,
}

/// DHCP section of an interface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DhcpSpec {
    #[serde(default)]
    pub mac: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    #[serde(default)]
    pub lease_time: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_servers: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,

    #[serde(default)]
    pub uefi: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iface_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpSpec>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vlan_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_search: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub broadcast: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classless_static_routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IpSpec {
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub netmask: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteSpec {
    pub destination_descriptor: String,
    pub router: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NetbootSpec {
    #[serde(rename = "allowPXE", skip_serializing_if = "Option::is_none")]
    pub allow_pxe: Option<bool>,

    #[serde(rename = "allowWorkflow", skip_serializing_if = "Option::is_none")]
    pub allow_workflow: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipxe: Option<IpxeSpec>,

    /// Per-machine ISO source
    #[serde(rename = "isoURL", default, skip_serializing_if = "String::is_empty")]
    pub iso_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IpxeSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HardwareMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility: Option<FacilityMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FacilityMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub facility_code: String,
}

impl HardwareDocument {
    /// Index of the interface whose MAC matches, ignoring case and separator style
    pub fn interface_for_mac(&self, mac: &MacAddr) -> Option<usize> {
        self.spec.interfaces.iter().position(|iface| {
            iface
                .dhcp
                .as_ref()
                .and_then(|dhcp| dhcp.mac.parse::<MacAddr>().ok())
                .is_some_and(|m| m == *mac)
        })
    }

    /// Index of the interface assigned `ip`
    pub fn interface_for_ip(&self, ip: Ipv4Addr) -> Option<usize> {
        self.spec.interfaces.iter().position(|iface| {
            iface
                .dhcp
                .as_ref()
                .and_then(|dhcp| dhcp.ip.as_ref())
                .and_then(|spec| spec.address.parse::<Ipv4Addr>().ok())
                .is_some_and(|addr| addr == ip)
        })
    }

    /// Convert the interface at `index` into lookup facts
    pub fn to_hardware(&self, index: usize) -> Result<Hardware> {
        let iface = self
            .spec
            .interfaces
            .get(index)
            .ok_or_else(|| DirectoryError::MissingField(format!("interfaces[{index}]")))?;

        let lease = lease_from(iface)?;
        let facility = self
            .spec
            .metadata
            .as_ref()
            .and_then(|m| m.facility.as_ref())
            .map(|f| f.facility_code.clone())
            .filter(|code| !code.is_empty());
        let netboot = netboot_from(iface.netboot.as_ref(), facility)?;

        Ok(Hardware::new(lease, netboot))
    }
}

fn lease_from(iface: &InterfaceSpec) -> Result<LeaseRecord> {
    let dhcp = iface
        .dhcp
        .as_ref()
        .ok_or_else(|| DirectoryError::MissingField("dhcp".to_string()))?;

    let mac: MacAddr = dhcp.mac.parse()?;

    let ip_spec = dhcp
        .ip
        .as_ref()
        .filter(|ip| !ip.address.is_empty())
        .ok_or_else(|| DirectoryError::MissingField("dhcp.ip.address".to_string()))?;
    if ip_spec.netmask.is_empty() {
        return Err(DirectoryError::MissingField("dhcp.ip.netmask".to_string()));
    }

    let ip: Ipv4Addr = ip_spec
        .address
        .parse()
        .map_err(|e| DirectoryError::invalid("dhcp.ip.address", e))?;
    let mask: Ipv4Addr = ip_spec
        .netmask
        .parse()
        .map_err(|e| DirectoryError::invalid("dhcp.ip.netmask", e))?;

    let mut lease = LeaseRecord::new(mac, ip, mask).with_lease_time(dhcp.lease_time);

    if !ip_spec.gateway.is_empty() {
        let gateway = ip_spec
            .gateway
            .parse()
            .map_err(|e| DirectoryError::invalid("dhcp.ip.gateway", e))?;
        lease = lease.with_gateway(gateway);
    }

    lease.dns_servers = parse_addresses(&dhcp.name_servers, "name server");
    lease.ntp_servers = parse_addresses(&dhcp.time_servers, "time server");

    if !dhcp.hostname.is_empty() {
        lease = lease.with_hostname(dhcp.hostname.clone());
    }
    if !dhcp.domain_name.is_empty() {
        lease = lease.with_domain_name(dhcp.domain_name.clone());
    }
    if !dhcp.broadcast.is_empty() {
        let broadcast = dhcp
            .broadcast
            .parse()
            .map_err(|e| DirectoryError::invalid("dhcp.broadcast", e))?;
        lease = lease.with_broadcast(broadcast);
    }
    lease.domain_search = dhcp
        .domain_search
        .iter()
        .filter(|d| !d.is_empty())
        .cloned()
        .collect();

    if !dhcp.vlan_id.is_empty() {
        match dhcp.vlan_id.parse::<u16>() {
            Ok(v) if v <= MAX_VLAN_ID => lease = lease.with_vlan_id(dhcp.vlan_id.clone()),
            _ => {
                return Err(DirectoryError::invalid(
                    "dhcp.vlan_id",
                    format!("{:?} is not a VLAN ID between 0 and {MAX_VLAN_ID}", dhcp.vlan_id),
                ))
            }
        }
    }

    for route in &dhcp.classless_static_routes {
        let destination: Ipv4Network = route
            .destination_descriptor
            .parse()
            .map_err(|e| DirectoryError::invalid("dhcp.classless_static_routes", e))?;
        let router: Ipv4Addr = route
            .router
            .parse()
            .map_err(|e| DirectoryError::invalid("dhcp.classless_static_routes", e))?;
        lease = lease.with_route(destination, router);
    }

    Ok(lease)
}

fn netboot_from(spec: Option<&NetbootSpec>, facility: Option<String>) -> Result<NetbootPolicy> {
    let mut policy = NetbootPolicy {
        facility,
        ..Default::default()
    };
    let Some(spec) = spec else {
        return Ok(policy);
    };

    policy.allow_netboot = spec.allow_pxe.unwrap_or(false);

    if let Some(url) = spec.ipxe.as_ref().map(|i| i.url.as_str()).filter(|u| !u.is_empty()) {
        let url = Url::parse(url).map_err(|e| DirectoryError::invalid("netboot.ipxe.url", e))?;
        policy.ipxe_script_url = Some(url);
    }
    if !spec.iso_url.is_empty() {
        let url =
            Url::parse(&spec.iso_url).map_err(|e| DirectoryError::invalid("netboot.isoURL", e))?;
        policy.iso_url = Some(url);
    }

    Ok(policy)
}

/// Parse each address, skipping (and logging) the ones that fail
fn parse_addresses(raw: &[String], what: &str) -> Vec<Ipv4Addr> {
    raw.iter()
        .filter_map(|s| match s.parse() {
            Ok(addr) => Some(addr),
            Err(_) => {
                debug!(value = %s, kind = what, "Skipping unparseable address");
                None
            }
        })
        .collect()
}
