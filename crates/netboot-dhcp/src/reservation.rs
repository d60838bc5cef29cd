//! Reservation handler
//!
//! Turns one decoded request into either a reply or a reason for staying
//! silent. Only machines the hardware directory knows about are ever
//! answered; there is no dynamic pool and no state kept between packets.
//!
//! | Request              | Directory        | Outcome           |
//! |----------------------|------------------|-------------------|
//! | DISCOVER             | record found     | OFFER             |
//! | REQUEST              | record found     | ACK               |
//! | DISCOVER / REQUEST   | not found        | ignored           |
//! | DISCOVER / REQUEST   | error or timeout | ignored, warned   |
//! | RELEASE / DECLINE    | not consulted    | ignored           |
//! | INFORM and others    | not consulted    | ignored           |

use crate::codec::DhcpMessage;
use crate::config::DhcpConfig;
use crate::error::{DhcpError, Result};
use crate::netboot::{self, ClientInfo};
use crate::vendor::{pxe_vendor_options, TraceToken};
use dhcproto::v4::{DhcpOption, MessageType, Opcode};
use dhcproto::Name;
use ipnet::Ipv4Net;
use netboot_hardware::{ClasslessRoute, Hardware, HardwareDirectory, MacAddr};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a request got no reply
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    /// Not a BOOTREQUEST
    NotRequest,
    /// Option 53 missing
    MissingMessageType,
    /// Hardware address is not a 6-byte MAC
    InvalidHardwareAddress,
    /// Client released its lease
    Release,
    /// Client declined the offered address
    Decline,
    /// Message type this server does not answer
    Unsupported(MessageType),
    /// MAC is not in the hardware directory
    UnknownHardware,
    /// Directory failed or timed out
    Backend(String),
    /// Reply could not be built
    Encode(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotRequest => write!(f, "not a boot request"),
            IgnoreReason::MissingMessageType => write!(f, "missing message type"),
            IgnoreReason::InvalidHardwareAddress => write!(f, "invalid hardware address"),
            IgnoreReason::Release => write!(f, "release"),
            IgnoreReason::Decline => write!(f, "decline"),
            IgnoreReason::Unsupported(t) => write!(f, "unsupported message type {t:?}"),
            IgnoreReason::UnknownHardware => write!(f, "unknown hardware"),
            IgnoreReason::Backend(e) => write!(f, "backend error: {e}"),
            IgnoreReason::Encode(e) => write!(f, "encode error: {e}"),
        }
    }
}

/// Result of handling one request
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    Reply(DhcpMessage),
    Ignored(IgnoreReason),
}

impl HandlerOutcome {
    pub fn into_reply(self) -> Option<DhcpMessage> {
        match self {
            HandlerOutcome::Reply(msg) => Some(msg),
            HandlerOutcome::Ignored(_) => None,
        }
    }
}

/// Answers DISCOVER and REQUEST for machines in the hardware directory
pub struct ReservationHandler {
    config: DhcpConfig,
    directory: Arc<dyn HardwareDirectory>,
}

impl ReservationHandler {
    pub fn new(config: DhcpConfig, directory: Arc<dyn HardwareDirectory>) -> Self {
        Self { config, directory }
    }

    pub fn config(&self) -> &DhcpConfig {
        &self.config
    }

    /// The reply for `request`, if it deserves one
    pub async fn handle(&self, request: &DhcpMessage) -> Option<DhcpMessage> {
        self.process(request).await.into_reply()
    }

    /// Classify `request` and build the reply
    pub async fn process(&self, request: &DhcpMessage) -> HandlerOutcome {
        if request.opcode() != Opcode::BootRequest {
            return HandlerOutcome::Ignored(IgnoreReason::NotRequest);
        }
        let Some(message_type) = request.message_type() else {
            debug!(xid = request.xid(), "Request has no message type, ignoring");
            return HandlerOutcome::Ignored(IgnoreReason::MissingMessageType);
        };
        let Some(mac) = request.mac() else {
            debug!(
                xid = request.xid(),
                hlen = request.message().hlen(),
                "Request has no usable MAC, ignoring"
            );
            return HandlerOutcome::Ignored(IgnoreReason::InvalidHardwareAddress);
        };

        let reply_type = match &message_type {
            MessageType::Discover => MessageType::Offer,
            MessageType::Request => MessageType::Ack,
            MessageType::Release => {
                debug!(mac = %mac, xid = request.xid(), "Received RELEASE");
                return HandlerOutcome::Ignored(IgnoreReason::Release);
            }
            MessageType::Decline => {
                info!(mac = %mac, xid = request.xid(), "Client declined offered address");
                return HandlerOutcome::Ignored(IgnoreReason::Decline);
            }
            other => {
                debug!(mac = %mac, msg_type = ?other, "Unsupported message type, ignoring");
                return HandlerOutcome::Ignored(IgnoreReason::Unsupported(other.clone()));
            }
        };

        let hardware = match self.lookup(&mac).await {
            Ok(hw) => hw,
            Err(DhcpError::Directory(e)) if e.is_not_found() => {
                debug!(mac = %mac, "No hardware record found, ignoring");
                return HandlerOutcome::Ignored(IgnoreReason::UnknownHardware);
            }
            Err(e) => {
                warn!(mac = %mac, error = %e, "Hardware lookup failed, dropping request");
                return HandlerOutcome::Ignored(IgnoreReason::Backend(e.to_string()));
            }
        };

        if message_type == MessageType::Request {
            let ciaddr = request.ciaddr();
            let requested = request
                .requested_ip()
                .or_else(|| (!ciaddr.is_unspecified()).then_some(ciaddr));
            if let Some(requested) = requested.filter(|ip| *ip != hardware.lease.ip) {
                debug!(
                    mac = %mac,
                    requested = %requested,
                    lease_ip = %hardware.lease.ip,
                    "Requested address differs from reservation, acknowledging reservation"
                );
            }
        }

        let reply = self.build_reply(request, mac, reply_type, &hardware);
        match reply {
            Ok(reply) => HandlerOutcome::Reply(reply),
            Err(e) => {
                warn!(mac = %mac, error = %e, "Failed to build reply");
                HandlerOutcome::Ignored(IgnoreReason::Encode(e.to_string()))
            }
        }
    }

    async fn lookup(&self, mac: &MacAddr) -> Result<Hardware> {
        let timeout = self.config.lookup_timeout;
        match tokio::time::timeout(timeout, self.directory.lookup_by_mac(mac)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DhcpError::LookupTimeout(timeout)),
        }
    }

    /// OFFER or ACK carrying the reservation and netboot options
    fn build_reply(
        &self,
        request: &DhcpMessage,
        mac: MacAddr,
        reply_type: MessageType,
        hardware: &Hardware,
    ) -> Result<DhcpMessage> {
        let lease = &hardware.lease;
        let mut reply = DhcpMessage::reply_to(request)
            .with_option(DhcpOption::MessageType(reply_type))
            .with_option(DhcpOption::ServerIdentifier(self.config.server_ip))
            .with_option(DhcpOption::AddressLeaseTime(lease.lease_time))
            .with_option(DhcpOption::SubnetMask(lease.subnet_mask));
        reply.set_yiaddr(lease.ip);

        if let Some(gateway) = lease.gateway {
            reply.insert(DhcpOption::Router(vec![gateway]));
        }
        if !lease.dns_servers.is_empty() {
            reply.insert(DhcpOption::DomainNameServer(lease.dns_servers.clone()));
        }
        if let Some(domain) = non_empty(&lease.domain_name) {
            reply.insert(DhcpOption::DomainName(domain.to_string()));
        }
        if let Some(hostname) = non_empty(&lease.hostname) {
            reply.insert(DhcpOption::Hostname(hostname.to_string()));
        }
        if !lease.broadcast.is_unspecified() {
            reply.insert(DhcpOption::BroadcastAddr(lease.broadcast));
        }
        if !lease.ntp_servers.is_empty() {
            reply.insert(DhcpOption::NtpServers(lease.ntp_servers.clone()));
        }
        if !lease.domain_search.is_empty() {
            reply.insert(DhcpOption::DomainSearch(search_domains(&lease.domain_search)?));
        }
        if !lease.classless_routes.is_empty() {
            reply.insert(DhcpOption::ClasslessStaticRoute(static_routes(
                &lease.classless_routes,
            )?));
        }

        let client = ClientInfo::from_message(request);
        if let Some(decision) = netboot::resolve(&self.config.netboot, mac, &client, &hardware.netboot)
        {
            if let Some(class) = decision.class_identifier {
                reply.insert(DhcpOption::ClassIdentifier(
                    class.class_identifier().as_bytes().to_vec(),
                ));
            }
            let trace = TraceToken::generate();
            let vendor = pxe_vendor_options(&trace).encode()?;
            reply.insert(DhcpOption::VendorExtensions(vendor.to_vec()));
            reply.set_siaddr(decision.next_server.unwrap_or(Ipv4Addr::UNSPECIFIED));
            reply.set_boot_file(&decision.file);

            debug!(
                mac = %mac,
                arch = ?client.arch,
                client_type = ?client.client_type,
                boot_file = %decision.file,
                traceparent = %trace,
                "Added netboot options"
            );
        }

        Ok(reply)
    }
}

impl fmt::Debug for ReservationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Option 119 entries, in lease order
fn search_domains(domains: &[String]) -> Result<Vec<Name>> {
    domains
        .iter()
        .map(|domain| {
            domain
                .parse::<Name>()
                .map_err(|e| DhcpError::EncodeError(format!("search domain {domain}: {e}")))
        })
        .collect()
}

/// Option 121 entries, in lease order
fn static_routes(routes: &[ClasslessRoute]) -> Result<Vec<(Ipv4Net, Ipv4Addr)>> {
    routes
        .iter()
        .map(|route| {
            Ipv4Net::new(route.destination.network(), route.destination.prefix())
                .map(|net| (net, route.router))
                .map_err(|e| DhcpError::EncodeError(format!("route {}: {e}", route.destination)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BOOTP_HEADER_LEN;
    use crate::config::NetbootConfig;
    use crate::vendor::{DISCOVERY_USE_BOOTFILE, PXE_DISCOVERY_CONTROL, TRACE_CONTEXT};
    use async_trait::async_trait;
    use dhcproto::v4::{Architecture, OptionCode};
    use netboot_hardware::{DirectoryError, LeaseRecord, MemoryDirectory, NetbootPolicy};
    use std::time::Duration;
    use url::Url;

    fn test_mac() -> MacAddr {
        "01:02:03:04:05:06".parse().unwrap()
    }

    fn test_lease() -> LeaseRecord {
        LeaseRecord::new(
            test_mac(),
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(255, 255, 255, 0),
        )
        .with_gateway(Ipv4Addr::new(192, 168, 1, 1))
        .with_dns_server(Ipv4Addr::new(1, 1, 1, 1))
        .with_hostname("test-host")
        .with_domain_name("mydomain.com")
        .with_broadcast(Ipv4Addr::new(192, 168, 1, 255))
        .with_ntp_server(Ipv4Addr::new(132, 163, 96, 2))
        .with_lease_time(60)
        .with_search_domain("mydomain.com")
    }

    fn handler_with(policy: NetbootPolicy) -> ReservationHandler {
        let directory: MemoryDirectory = [Hardware::new(test_lease(), policy)].into_iter().collect();
        ReservationHandler::new(DhcpConfig::new(Ipv4Addr::new(127, 0, 0, 1)), Arc::new(directory))
    }

    fn request(message_type: MessageType) -> DhcpMessage {
        DhcpMessage::request(0x1234, test_mac()).with_option(DhcpOption::MessageType(message_type))
    }

    fn tinkerbell_discover() -> DhcpMessage {
        request(MessageType::Discover)
            .with_option(DhcpOption::UserClass(b"Tinkerbell".to_vec()))
            .with_option(DhcpOption::ClassIdentifier(
                b"HTTPClient:Arch:xxxxx:UNDI:yyyzzz".to_vec(),
            ))
            .with_option(DhcpOption::ClientSystemArchitecture(Architecture::from(16u16)))
            .with_option(DhcpOption::ClientMachineIdentifier(vec![
                0x00, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x02,
                0x03, 0x04, 0x05,
            ]))
    }

    fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    struct FailingDirectory;

    #[async_trait]
    impl HardwareDirectory for FailingDirectory {
        async fn lookup_by_mac(&self, _mac: &MacAddr) -> netboot_hardware::Result<Hardware> {
            Err(DirectoryError::Backend("connection refused".to_string()))
        }

        async fn lookup_by_ip(&self, _ip: Ipv4Addr) -> netboot_hardware::Result<Hardware> {
            Err(DirectoryError::Backend("connection refused".to_string()))
        }
    }

    struct SlowDirectory;

    #[async_trait]
    impl HardwareDirectory for SlowDirectory {
        async fn lookup_by_mac(&self, _mac: &MacAddr) -> netboot_hardware::Result<Hardware> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(DirectoryError::Backend("unreachable".to_string()))
        }

        async fn lookup_by_ip(&self, _ip: Ipv4Addr) -> netboot_hardware::Result<Hardware> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(DirectoryError::Backend("unreachable".to_string()))
        }
    }

    fn ignored(outcome: HandlerOutcome) -> IgnoreReason {
        match outcome {
            HandlerOutcome::Ignored(reason) => reason,
            HandlerOutcome::Reply(reply) => panic!("unexpected reply: {reply:?}"),
        }
    }

    #[tokio::test]
    async fn test_discover_with_netboot_options() {
        let policy = NetbootPolicy::allowed()
            .with_ipxe_script_url(Url::parse("http://localhost:8181/auto.ipxe").unwrap());
        let handler = handler_with(policy);

        let reply = handler.handle(&tinkerbell_discover()).await.unwrap();

        assert_eq!(reply.opcode(), Opcode::BootReply);
        assert_eq!(reply.xid(), 0x1234);
        assert_eq!(reply.mac(), Some(test_mac()));
        assert_eq!(reply.yiaddr(), Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(reply.ciaddr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(reply.siaddr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(reply.giaddr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(reply.boot_file(), "http://localhost:8181/auto.ipxe");
        assert_eq!(reply.message_type(), Some(MessageType::Offer));
        assert_eq!(
            reply.option_codes(),
            vec![1, 3, 6, 12, 15, 28, 42, 43, 51, 53, 54, 60, 119]
        );
        assert!(matches!(
            reply.get(OptionCode::ServerIdentifier),
            Some(DhcpOption::ServerIdentifier(ip)) if *ip == Ipv4Addr::new(127, 0, 0, 1)
        ));
        assert!(matches!(
            reply.get(OptionCode::AddressLeaseTime),
            Some(DhcpOption::AddressLeaseTime(60))
        ));
        assert_eq!(reply.class_identifier(), Some(&b"HTTPClient"[..]));

        let vendor = reply.vendor_extensions().unwrap();
        assert_eq!(&vendor[..3], &[PXE_DISCOVERY_CONTROL, 1, DISCOVERY_USE_BOOTFILE]);
        assert_eq!(vendor[3], TRACE_CONTEXT);
        assert_eq!(vendor[4] as usize, TraceToken::LEN);
        assert!(TraceToken::from_bytes(&vendor[5..31]).is_some());
    }

    #[tokio::test]
    async fn test_search_domain_wire_format() {
        let handler = handler_with(NetbootPolicy::default());

        let reply = handler.handle(&request(MessageType::Discover)).await.unwrap();
        let wire = reply.encode().unwrap();

        let mut expected = vec![119, 14, 8];
        expected.extend_from_slice(b"mydomain");
        expected.push(3);
        expected.extend_from_slice(b"com");
        expected.push(0);
        assert!(contains_bytes(&wire, &expected));
    }

    #[tokio::test]
    async fn test_request_gets_ack_with_lease_ip() {
        let handler = handler_with(NetbootPolicy::default());
        let req = request(MessageType::Request)
            .with_option(DhcpOption::RequestedIpAddress(Ipv4Addr::new(192, 168, 1, 77)));

        let reply = handler.handle(&req).await.unwrap();

        assert_eq!(reply.message_type(), Some(MessageType::Ack));
        assert_eq!(reply.yiaddr(), Ipv4Addr::new(192, 168, 1, 100));
        assert!(reply.boot_file().is_empty());
        assert!(reply.get(OptionCode::VendorExtensions).is_none());
        assert!(reply.get(OptionCode::ClassIdentifier).is_none());
    }

    #[tokio::test]
    async fn test_reply_zeroes_ciaddr_and_echoes_giaddr() {
        let handler = handler_with(NetbootPolicy::default());
        let mut req = request(MessageType::Request);
        req.set_ciaddr(Ipv4Addr::new(192, 168, 1, 100));
        req.set_giaddr(Ipv4Addr::new(10, 1, 1, 1));

        let reply = handler.handle(&req).await.unwrap();

        assert_eq!(reply.ciaddr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(reply.giaddr(), Ipv4Addr::new(10, 1, 1, 1));
    }

    #[tokio::test]
    async fn test_netboot_not_allowed_sends_empty_file() {
        let handler = handler_with(NetbootPolicy::default());

        let reply = handler.handle(&tinkerbell_discover()).await.unwrap();

        assert!(reply.boot_file().is_empty());
        assert_eq!(reply.class_identifier(), Some(&b"HTTPClient"[..]));
        assert!(reply.vendor_extensions().is_some());
    }

    #[tokio::test]
    async fn test_netboot_globally_disabled() {
        let directory: MemoryDirectory = [Hardware::new(test_lease(), NetbootPolicy::allowed())]
            .into_iter()
            .collect();
        let config = DhcpConfig::new(Ipv4Addr::new(127, 0, 0, 1)).with_netboot(NetbootConfig::disabled());
        let handler = ReservationHandler::new(config, Arc::new(directory));

        let reply = handler.handle(&tinkerbell_discover()).await.unwrap();

        assert!(reply.boot_file().is_empty());
        assert!(reply.vendor_extensions().is_none());
    }

    #[tokio::test]
    async fn test_classless_routes_included() {
        let lease = test_lease().with_route(
            "10.20.0.0/16".parse().unwrap(),
            Ipv4Addr::new(192, 168, 1, 254),
        );
        let directory: MemoryDirectory = [Hardware::new(lease, NetbootPolicy::default())]
            .into_iter()
            .collect();
        let handler = ReservationHandler::new(
            DhcpConfig::new(Ipv4Addr::new(127, 0, 0, 1)),
            Arc::new(directory),
        );

        let reply = handler.handle(&request(MessageType::Discover)).await.unwrap();
        match reply.get(OptionCode::ClasslessStaticRoute) {
            Some(DhcpOption::ClasslessStaticRoute(routes)) => {
                assert_eq!(
                    routes,
                    &vec![(
                        "10.20.0.0/16".parse::<Ipv4Net>().unwrap(),
                        Ipv4Addr::new(192, 168, 1, 254)
                    )]
                );
            }
            other => panic!("unexpected option 121: {other:?}"),
        }

        let wire = reply.encode().unwrap();
        assert!(contains_bytes(&wire, &[121, 7, 16, 10, 20, 192, 168, 1, 254]));
    }

    #[tokio::test]
    async fn test_unknown_mac_gets_no_reply() {
        let handler = handler_with(NetbootPolicy::default());
        let req = DhcpMessage::request(1, "aa:bb:cc:dd:ee:ff".parse().unwrap())
            .with_option(DhcpOption::MessageType(MessageType::Discover));

        assert_eq!(ignored(handler.process(&req).await), IgnoreReason::UnknownHardware);
    }

    #[tokio::test]
    async fn test_fire_and_forget_types_ignored() {
        let handler = handler_with(NetbootPolicy::allowed());

        assert_eq!(
            ignored(handler.process(&request(MessageType::Release)).await),
            IgnoreReason::Release
        );
        assert_eq!(
            ignored(handler.process(&request(MessageType::Decline)).await),
            IgnoreReason::Decline
        );
        assert_eq!(
            ignored(handler.process(&request(MessageType::Inform)).await),
            IgnoreReason::Unsupported(MessageType::Inform)
        );
        assert!(handler.handle(&request(MessageType::Unknown(42))).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_requests_ignored() {
        let handler = handler_with(NetbootPolicy::allowed());

        let mut reply_op = request(MessageType::Discover);
        reply_op.message_mut().set_opcode(Opcode::BootReply);
        assert_eq!(ignored(handler.process(&reply_op).await), IgnoreReason::NotRequest);

        let no_type = DhcpMessage::request(1, test_mac());
        assert_eq!(
            ignored(handler.process(&no_type).await),
            IgnoreReason::MissingMessageType
        );

        let mut bad_hlen = request(MessageType::Discover);
        bad_hlen.message_mut().set_chaddr(&[1u8; 16]);
        assert_eq!(
            ignored(handler.process(&bad_hlen).await),
            IgnoreReason::InvalidHardwareAddress
        );
    }

    #[tokio::test]
    async fn test_malformed_requested_ip_still_offered() {
        let handler = handler_with(NetbootPolicy::default());
        let mut wire = request(MessageType::Discover).encode().unwrap();
        wire.truncate(BOOTP_HEADER_LEN + 4);
        // Option 50 with a 3-byte value
        wire.extend_from_slice(&[53, 1, 1, 50, 3, 192, 168, 1, 255]);

        let decoded = DhcpMessage::decode(&wire).unwrap();
        let reply = handler.handle(&decoded).await.unwrap();

        assert_eq!(reply.message_type(), Some(MessageType::Offer));
        assert_eq!(reply.yiaddr(), Ipv4Addr::new(192, 168, 1, 100));
    }

    #[tokio::test]
    async fn test_backend_error_gets_no_reply() {
        let handler = ReservationHandler::new(
            DhcpConfig::new(Ipv4Addr::new(127, 0, 0, 1)),
            Arc::new(FailingDirectory),
        );

        let outcome = handler.process(&request(MessageType::Discover)).await;
        assert!(matches!(outcome, HandlerOutcome::Ignored(IgnoreReason::Backend(_))));
    }

    #[tokio::test]
    async fn test_lookup_timeout_gets_no_reply() {
        let config = DhcpConfig::new(Ipv4Addr::new(127, 0, 0, 1))
            .with_lookup_timeout(Duration::from_millis(100));
        let handler = ReservationHandler::new(config, Arc::new(SlowDirectory));

        match ignored(handler.process(&request(MessageType::Request)).await) {
            IgnoreReason::Backend(msg) => assert!(msg.contains("timed out")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reply_encodes() {
        let policy = NetbootPolicy::allowed();
        let handler = handler_with(policy);
        let req = request(MessageType::Discover)
            .with_option(DhcpOption::ClassIdentifier(b"PXEClient:Arch:00000".to_vec()))
            .with_option(DhcpOption::ClientSystemArchitecture(Architecture::from(0u16)));

        let reply = handler.handle(&req).await.unwrap();
        assert_eq!(reply.boot_file(), "undionly.kpxe");
        assert_eq!(reply.siaddr(), Ipv4Addr::new(127, 0, 0, 1));

        let wire = reply.encode().unwrap();
        let decoded = DhcpMessage::decode(&wire).unwrap();
        assert_eq!(decoded.boot_file(), "undionly.kpxe");
        assert_eq!(decoded.yiaddr(), Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(decoded.class_identifier(), Some(&b"PXEClient"[..]));
    }
}
