//! Kernel command line assembly

use crate::config::KernelParams;
use netboot_hardware::{Hardware, LeaseRecord, MacAddr};
use std::net::Ipv4Addr;

const CONSOLES: [&str; 5] = ["ttyAMA0", "ttyS0", "tty0", "tty1", "ttyS1"];

/// Build the kernel command line for `mac`.
///
/// `hardware` is `None` when the directory has no record; the line then
/// carries only the MAC-derived and fixed parameters.
pub fn kernel_cmdline(
    params: &KernelParams,
    static_ipam: bool,
    mac: MacAddr,
    hardware: Option<&Hardware>,
) -> String {
    let facility = hardware
        .and_then(|hw| hw.netboot.facility.as_deref())
        .unwrap_or_default();
    let vlan = hardware
        .and_then(|hw| hw.lease.vlan_id.as_deref())
        .filter(|v| !v.is_empty());

    let mut parts = vec![format!("facility={facility}")];
    parts.extend(CONSOLES.iter().map(|c| format!("console={c}")));
    if let Some(vlan) = vlan {
        parts.push(format!("vlan_id={vlan}"));
    }
    parts.push(format!("hw_addr={mac}"));
    if let Some(syslog) = params.syslog_host.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("syslog_host={syslog}"));
    }
    parts.push(format!("grpc_authority={}", params.grpc_authority));
    parts.push(format!("tinkerbell_tls={}", params.tls));
    parts.push(format!("worker_id={mac}"));
    parts.extend(params.extra.iter().cloned());

    if static_ipam {
        if let Some(hw) = hardware {
            parts.push(format!("ipam={}", ipam_value(&hw.lease)));
        }
    }

    parts.join(" ")
}

/// `mac:vlan:ip:netmask:gateway:hostname:dns:search:ntp`, lists comma separated
fn ipam_value(lease: &LeaseRecord) -> String {
    let join = |addrs: &[Ipv4Addr]| {
        addrs
            .iter()
            .map(Ipv4Addr::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    [
        lease.mac.to_dashed(),
        lease.vlan_id.clone().unwrap_or_default(),
        lease.ip.to_string(),
        lease.subnet_mask.to_string(),
        lease.gateway.map(|gw| gw.to_string()).unwrap_or_default(),
        lease.hostname.clone().unwrap_or_default(),
        join(&lease.dns_servers),
        lease.domain_search.join(","),
        join(&lease.ntp_servers),
    ]
    .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use netboot_hardware::NetbootPolicy;

    fn mac() -> MacAddr {
        "de:ed:be:ef:fe:ed".parse().unwrap()
    }

    fn params() -> KernelParams {
        KernelParams::new("127.0.0.1:42113")
            .with_syslog_host("127.0.0.1:514")
            .with_extra("k1=1")
            .with_extra("k2=2")
    }

    fn hardware() -> Hardware {
        let lease = LeaseRecord::new(
            mac(),
            Ipv4Addr::new(192, 168, 2, 10),
            Ipv4Addr::new(255, 255, 255, 0),
        )
        .with_vlan_id("400");
        Hardware::new(lease, NetbootPolicy::default().with_facility("test"))
    }

    #[test]
    fn test_cmdline_order() {
        let hw = hardware();
        let cmdline = kernel_cmdline(&params(), false, mac(), Some(&hw));
        assert_eq!(
            cmdline,
            "facility=test console=ttyAMA0 console=ttyS0 console=tty0 console=tty1 console=ttyS1 \
             vlan_id=400 hw_addr=de:ed:be:ef:fe:ed syslog_host=127.0.0.1:514 \
             grpc_authority=127.0.0.1:42113 tinkerbell_tls=false worker_id=de:ed:be:ef:fe:ed k1=1 k2=2"
        );
    }

    #[test]
    fn test_cmdline_static_ipam() {
        let mut hw = hardware();
        hw.lease = hw
            .lease
            .with_gateway(Ipv4Addr::new(192, 168, 2, 1))
            .with_hostname("worker1")
            .with_dns_server(Ipv4Addr::new(1, 1, 1, 1))
            .with_dns_server(Ipv4Addr::new(8, 8, 8, 8))
            .with_search_domain("example.com")
            .with_ntp_server(Ipv4Addr::new(132, 163, 96, 2));

        let cmdline = kernel_cmdline(&params(), true, mac(), Some(&hw));
        assert!(cmdline.ends_with(
            " k2=2 ipam=de-ed-be-ef-fe-ed:400:192.168.2.10:255.255.255.0:192.168.2.1:worker1:1.1.1.1,8.8.8.8:example.com:132.163.96.2"
        ));
    }

    #[test]
    fn test_cmdline_without_hardware() {
        let cmdline = kernel_cmdline(&KernelParams::new("tink:42113").with_tls(true), true, mac(), None);
        assert_eq!(
            cmdline,
            "facility= console=ttyAMA0 console=ttyS0 console=tty0 console=tty1 console=ttyS1 \
             hw_addr=de:ed:be:ef:fe:ed grpc_authority=tink:42113 tinkerbell_tls=true \
             worker_id=de:ed:be:ef:fe:ed"
        );
    }
}
