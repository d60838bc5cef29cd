//! Netboot artifact resolution
//!
//! Decides which boot file (if any) a client is told to fetch, based on
//! what the client signals about itself in options 60, 77, 93 and 97 and
//! on the machine's [`NetbootPolicy`].

use crate::codec::DhcpMessage;
use crate::config::NetbootConfig;
use dhcproto::v4::MessageType;
use netboot_hardware::{MacAddr, NetbootPolicy};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::debug;

/// Vendor class prefix sent by legacy PXE firmware
pub const PXE_CLIENT: &str = "PXEClient";

/// Vendor class prefix sent by UEFI HTTP boot firmware
pub const HTTP_CLIENT: &str = "HTTPClient";

/// User class set by iPXE
pub const USER_CLASS_IPXE: &str = "iPXE";

/// User class set by the custom Tinkerbell iPXE build
pub const USER_CLASS_TINKERBELL: &str = "Tinkerbell";

/// Client system architecture (option 93, RFC 4578 and IANA registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientArch {
    /// Intel x86 BIOS
    IntelX86Bios,
    NecPc98,
    EfiItanium,
    DecAlpha,
    ArcX86,
    IntelLeanClient,
    /// EFI IA32
    EfiX86,
    /// EFI x86_64
    EfiX64,
    EfiXscale,
    /// EFI byte code
    EfiBc,
    /// EFI ARM32
    EfiArm32,
    /// EFI ARM64
    EfiArm64,
    /// EFI x86 over HTTP
    EfiX86Http,
    /// EFI x86_64 over HTTP
    EfiX64Http,
    /// EFI ARM32 over HTTP
    EfiArm32Http,
    /// EFI ARM64 over HTTP
    EfiArm64Http,
    /// Raspberry Pi boot ROM
    Rpiboot,
    Other(u16),
}

impl From<u16> for ClientArch {
    fn from(value: u16) -> Self {
        match value {
            0 => ClientArch::IntelX86Bios,
            1 => ClientArch::NecPc98,
            2 => ClientArch::EfiItanium,
            3 => ClientArch::DecAlpha,
            4 => ClientArch::ArcX86,
            5 => ClientArch::IntelLeanClient,
            6 => ClientArch::EfiX86,
            7 => ClientArch::EfiX64,
            8 => ClientArch::EfiXscale,
            9 => ClientArch::EfiBc,
            10 => ClientArch::EfiArm32,
            11 => ClientArch::EfiArm64,
            15 => ClientArch::EfiX86Http,
            16 => ClientArch::EfiX64Http,
            18 => ClientArch::EfiArm32Http,
            19 => ClientArch::EfiArm64Http,
            41 => ClientArch::Rpiboot,
            other => ClientArch::Other(other),
        }
    }
}

impl ClientArch {
    /// Check if this is a UEFI architecture
    pub fn is_uefi(&self) -> bool {
        !matches!(
            self,
            ClientArch::IntelX86Bios
                | ClientArch::NecPc98
                | ClientArch::DecAlpha
                | ClientArch::ArcX86
                | ClientArch::IntelLeanClient
                | ClientArch::Other(_)
        )
    }

    /// The iPXE binary built for this architecture
    pub fn ipxe_binary(&self) -> Option<&'static str> {
        match self {
            ClientArch::IntelX86Bios
            | ClientArch::NecPc98
            | ClientArch::EfiItanium
            | ClientArch::DecAlpha
            | ClientArch::ArcX86
            | ClientArch::IntelLeanClient => Some("undionly.kpxe"),
            ClientArch::EfiX86
            | ClientArch::EfiX64
            | ClientArch::EfiXscale
            | ClientArch::EfiBc
            | ClientArch::EfiX86Http
            | ClientArch::EfiX64Http => Some("ipxe.efi"),
            ClientArch::EfiArm32
            | ClientArch::EfiArm64
            | ClientArch::EfiArm32Http
            | ClientArch::EfiArm64Http
            | ClientArch::Rpiboot => Some("snp.efi"),
            ClientArch::Other(_) => None,
        }
    }
}

/// Boot transport the firmware asked for via option 60
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Pxe,
    Http,
}

impl ClientType {
    fn from_class_identifier(class: &[u8]) -> Option<Self> {
        if class.starts_with(HTTP_CLIENT.as_bytes()) {
            Some(ClientType::Http)
        } else if class.starts_with(PXE_CLIENT.as_bytes()) {
            Some(ClientType::Pxe)
        } else {
            None
        }
    }

    /// Value echoed back in the reply's option 60
    pub fn class_identifier(&self) -> &'static str {
        match self {
            ClientType::Pxe => PXE_CLIENT,
            ClientType::Http => HTTP_CLIENT,
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_identifier())
    }
}

/// Option 77 as the boot chain uses it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserClass {
    Ipxe,
    Tinkerbell,
    Other(String),
}

impl UserClass {
    fn from_bytes(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        match text.as_ref() {
            USER_CLASS_IPXE => UserClass::Ipxe,
            USER_CLASS_TINKERBELL => UserClass::Tinkerbell,
            other => UserClass::Other(other.to_string()),
        }
    }
}

/// What a request tells us about the booting client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    pub message_type: Option<MessageType>,
    pub arch: Option<ClientArch>,
    pub client_type: Option<ClientType>,
    pub user_class: Option<UserClass>,
    /// Option 97 is absent, empty, or a 17-byte GUID with type 0
    pub machine_id_valid: bool,
}

impl ClientInfo {
    pub fn from_message(msg: &DhcpMessage) -> Self {
        let machine_id_valid = match msg.client_machine_id() {
            None => true,
            Some([]) => true,
            Some(id) => id.len() == 17 && id[0] == 0,
        };
        Self {
            message_type: msg.message_type(),
            arch: msg.client_arch().map(ClientArch::from),
            client_type: msg
                .class_identifier()
                .and_then(ClientType::from_class_identifier),
            user_class: msg.user_class().map(UserClass::from_bytes),
            machine_id_valid,
        }
    }

    /// A DISCOVER or REQUEST from PXE or HTTP boot firmware
    pub fn is_netboot_client(&self) -> bool {
        matches!(
            self.message_type,
            Some(MessageType::Discover) | Some(MessageType::Request)
        ) && self.client_type.is_some()
            && self.machine_id_valid
    }
}

/// Netboot fields to place in a reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootDecision {
    /// Boot file name; empty means boot from local disk
    pub file: String,
    /// Option 60 value to echo
    pub class_identifier: Option<ClientType>,
    /// siaddr
    pub next_server: Option<Ipv4Addr>,
}

/// Pick the boot file for `client`.
///
/// Returns `None` for clients that did not ask to netboot; they get a
/// plain lease.
pub fn resolve(
    config: &NetbootConfig,
    mac: MacAddr,
    client: &ClientInfo,
    policy: &NetbootPolicy,
) -> Option<BootDecision> {
    if !config.enabled || !client.is_netboot_client() {
        return None;
    }
    let client_type = client.client_type?;
    let mut decision = BootDecision {
        class_identifier: Some(client_type),
        ..Default::default()
    };

    if !policy.allow_netboot {
        debug!(mac = %mac, "Netboot not allowed for hardware");
        return Some(decision);
    }

    if let Some(url) = &policy.ipxe_script_url {
        decision.file = url.to_string();
        return Some(decision);
    }

    if client.user_class == Some(UserClass::Tinkerbell) {
        // Without a script URL the client would chainload iPXE again.
        match &config.ipxe_script_url {
            Some(url) => decision.file = url.to_string(),
            None => debug!(mac = %mac, "No iPXE script URL configured"),
        }
        return Some(decision);
    }

    let binary = match client.arch.and_then(|a| a.ipxe_binary()) {
        Some(binary) => binary,
        None => {
            debug!(mac = %mac, arch = ?client.arch, "No iPXE binary for client architecture");
            return Some(decision);
        }
    };

    if client_type == ClientType::Http {
        match &config.ipxe_http_binary_url {
            Some(base) => {
                decision.file = format!("{}/{}/{}", base.as_str().trim_end_matches('/'), mac, binary);
            }
            None => debug!(mac = %mac, "No iPXE HTTP binary URL configured"),
        }
        return Some(decision);
    }

    if client.user_class == Some(UserClass::Ipxe) {
        match config.tftp_server {
            Some(tftp) => decision.file = format!("tftp://{tftp}/{mac}/{binary}"),
            None => debug!(mac = %mac, "No TFTP server configured"),
        }
        return Some(decision);
    }

    decision.file = binary.to_string();
    decision.next_server = config.tftp_server.map(|addr| *addr.ip());
    Some(decision)
}
