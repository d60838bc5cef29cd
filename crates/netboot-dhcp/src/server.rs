//! DHCP server implementation
//!
//! This module owns the UDP socket. Every datagram is decoded and handed
//! to the [`ReservationHandler`] on its own task, so a slow directory
//! lookup for one client never holds up another.

use crate::codec::DhcpMessage;
use crate::config::DhcpConfig;
use crate::error::{DhcpError, Result};
use crate::reservation::{HandlerOutcome, IgnoreReason, ReservationHandler};
use dhcproto::v4::MessageType;
use netboot_hardware::{HardwareDirectory, MacAddr};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Event emitted by the DHCP server
#[derive(Debug, Clone)]
pub enum DhcpEvent {
    /// Server started
    Started { bind_addr: SocketAddr },
    /// Sent an OFFER
    Offered {
        mac: MacAddr,
        ip: Ipv4Addr,
        boot_file: String,
    },
    /// Sent an ACK
    Acknowledged {
        mac: MacAddr,
        ip: Ipv4Addr,
        boot_file: String,
    },
    /// Request answered with silence
    Ignored {
        mac: Option<MacAddr>,
        reason: IgnoreReason,
    },
    /// Client released its lease
    Released { mac: MacAddr },
    /// Client declined its address
    Declined { mac: MacAddr },
    /// Datagram was not a DHCP message
    DecodeFailed { src: SocketAddr, error: String },
    /// Server stopped
    Stopped,
}

/// DHCP server
pub struct DhcpServer {
    handler: Arc<ReservationHandler>,
    event_sender: broadcast::Sender<DhcpEvent>,
}

impl DhcpServer {
    /// Create a new DHCP server
    pub fn new(config: DhcpConfig, directory: Arc<dyn HardwareDirectory>) -> Self {
        Self::with_handler(ReservationHandler::new(config, directory))
    }

    pub fn with_handler(handler: ReservationHandler) -> Self {
        let (event_sender, _) = broadcast::channel(1024);
        Self {
            handler: Arc::new(handler),
            event_sender,
        }
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<DhcpEvent> {
        self.event_sender.subscribe()
    }

    pub fn config(&self) -> &DhcpConfig {
        self.handler.config()
    }

    /// Bind the configured address and serve until `shutdown` flips
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let socket = self.bind()?;
        self.serve(socket, shutdown).await
    }

    /// Create and configure the UDP socket
    pub fn bind(&self) -> Result<UdpSocket> {
        create_socket(self.config().bind_addr)
    }

    /// Serve requests arriving on `socket` until `shutdown` flips to true.
    /// In-flight requests are allowed to finish before this returns.
    pub async fn serve(&self, socket: UdpSocket, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let socket = Arc::new(socket);
        let bind_addr = socket.local_addr()?;

        info!(addr = %bind_addr, server_ip = %self.config().server_ip, "DHCP server started");
        let _ = self.event_sender.send(DhcpEvent::Started { bind_addr });

        let mut buf = [0u8; 1500];
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                result = socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, src)) => {
                            let data = buf[..len].to_vec();
                            let handler = Arc::clone(&self.handler);
                            let socket = Arc::clone(&socket);
                            let events = self.event_sender.clone();
                            tasks.spawn(async move {
                                if let Err(e) = handle_packet(&handler, &socket, &events, &data, src).await {
                                    error!(error = %e, src = %src, "Error handling DHCP packet");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Error receiving packet");
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "DHCP packet task failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("DHCP server shutting down");
                        break;
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "DHCP packet task failed");
            }
        }
        let _ = self.event_sender.send(DhcpEvent::Stopped);
        Ok(())
    }
}

impl std::fmt::Debug for DhcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhcpServer")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}

/// Where a reply to `request` goes: the relay agent when the request was
/// relayed, the client's own address when it has one, broadcast otherwise
pub fn reply_destination(request: &DhcpMessage, config: &DhcpConfig) -> SocketAddr {
    let giaddr = request.giaddr();
    let ciaddr = request.ciaddr();
    if !giaddr.is_unspecified() {
        SocketAddr::new(giaddr.into(), config.relay_port)
    } else if !ciaddr.is_unspecified() {
        SocketAddr::new(ciaddr.into(), config.client_port)
    } else {
        SocketAddr::new(Ipv4Addr::BROADCAST.into(), config.client_port)
    }
}

fn create_socket(bind_addr: SocketAddrV4) -> Result<UdpSocket> {
    let bind_failed = |source| DhcpError::BindFailed {
        addr: bind_addr.into(),
        source,
    };

    let socket = socket2::Socket::new(
        socket2::Domain::IPV4,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )
    .map_err(bind_failed)?;

    socket.set_reuse_address(true).ok();
    socket.set_broadcast(true).map_err(bind_failed)?;
    socket.bind(&bind_addr.into()).map_err(bind_failed)?;
    socket.set_nonblocking(true).map_err(bind_failed)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket).map_err(bind_failed)
}

async fn handle_packet(
    handler: &ReservationHandler,
    socket: &UdpSocket,
    events: &broadcast::Sender<DhcpEvent>,
    data: &[u8],
    src: SocketAddr,
) -> Result<()> {
    let request = match DhcpMessage::decode(data) {
        Ok(req) => req,
        Err(e) => {
            debug!(error = %e, src = %src, "Failed to parse DHCP packet");
            let _ = events.send(DhcpEvent::DecodeFailed {
                src,
                error: e.to_string(),
            });
            return Ok(());
        }
    };
    let mac = request.mac();

    debug!(
        mac = ?mac,
        xid = request.xid(),
        msg_type = ?request.message_type(),
        src = %src,
        "Received DHCP request"
    );

    let reply = match handler.process(&request).await {
        HandlerOutcome::Reply(reply) => reply,
        HandlerOutcome::Ignored(reason) => {
            let event = match (reason, mac) {
                (IgnoreReason::Release, Some(mac)) => DhcpEvent::Released { mac },
                (IgnoreReason::Decline, Some(mac)) => DhcpEvent::Declined { mac },
                (reason, mac) => DhcpEvent::Ignored { mac, reason },
            };
            let _ = events.send(event);
            return Ok(());
        }
    };

    let bytes = reply.encode()?;
    let dest = reply_destination(&request, handler.config());
    socket.send_to(&bytes, dest).await?;

    let msg_type = reply.message_type();
    let ip = reply.yiaddr();
    let boot_file = reply.boot_file();
    info!(
        mac = ?mac,
        xid = reply.xid(),
        msg_type = ?msg_type,
        offered_ip = %ip,
        boot_file = %boot_file,
        dest = %dest,
        "Sent DHCP response"
    );

    let Some(mac) = mac else {
        return Ok(());
    };
    let event = match msg_type {
        Some(MessageType::Offer) => DhcpEvent::Offered { mac, ip, boot_file },
        Some(MessageType::Ack) => DhcpEvent::Acknowledged { mac, ip, boot_file },
        other => {
            warn!(mac = %mac, msg_type = ?other, "Sent reply of unexpected type");
            return Ok(());
        }
    };
    let _ = events.send(event);
    Ok(())
}
