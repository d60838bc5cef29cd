//! DHCPv4 message codec
//!
//! [`DhcpMessage`] wraps a [`dhcproto`] message and adds the accessors the
//! reservation handler needs. Decoding never panics on short or malformed
//! input; it returns a parse error that the server logs and drops.

use crate::error::{DhcpError, Result};
use dhcproto::v4::{DhcpOption, HType, Message, MessageType, Opcode, OptionCode, UnknownOption};
use dhcproto::{Decodable, Encodable};
use netboot_hardware::MacAddr;
use std::net::Ipv4Addr;
use tracing::debug;

/// Length of the fixed BOOTP header
pub const BOOTP_HEADER_LEN: usize = 236;

/// Cookie that marks the start of DHCP options
pub const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Minimum BOOTP message size; shorter replies are zero padded
pub const MIN_MESSAGE_LEN: usize = 300;

const OPTIONS_OFFSET: usize = BOOTP_HEADER_LEN + MAGIC_COOKIE.len();
const FILE_LEN: usize = 128;
const OPT_PAD: u8 = 0;
const OPT_END: u8 = 255;

/// A DHCPv4 message
#[derive(Debug, Clone)]
pub struct DhcpMessage {
    message: Message,
}

impl From<Message> for DhcpMessage {
    fn from(message: Message) -> Self {
        Self { message }
    }
}

impl DhcpMessage {
    /// An empty BOOTREQUEST for `mac`, as a client would start one
    pub fn request(xid: u32, mac: MacAddr) -> Self {
        let mut message = Message::default();
        message.set_opcode(Opcode::BootRequest);
        message.set_htype(HType::Eth);
        message.set_xid(xid);
        message.set_chaddr(&mac.octets());
        Self { message }
    }

    /// BOOTREPLY skeleton that echoes the fields a reply must carry over
    /// from `request`: xid, flags, giaddr, and the hardware address.
    ///
    /// giaddr is echoed rather than zeroed so relay agents can route the
    /// reply back to the client's segment (RFC 2131 section 4.1).
    pub fn reply_to(request: &DhcpMessage) -> Self {
        let req = &request.message;
        let mut message = Message::default();
        message.set_opcode(Opcode::BootReply);
        message.set_htype(req.htype());
        message.set_xid(req.xid());
        message.set_flags(req.flags());
        message.set_giaddr(req.giaddr());
        message.set_chaddr(req.chaddr());
        Self { message }
    }

    pub fn with_option(mut self, opt: DhcpOption) -> Self {
        self.insert(opt);
        self
    }

    pub fn insert(&mut self, opt: DhcpOption) {
        self.message.opts_mut().insert(opt);
    }

    pub fn get(&self, code: OptionCode) -> Option<&DhcpOption> {
        self.message.opts().get(code)
    }

    /// Option codes present, ascending
    pub fn option_codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self
            .message
            .opts()
            .iter()
            .map(|(code, _)| u8::from(*code))
            .collect();
        codes.sort_unstable();
        codes
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    pub fn opcode(&self) -> Opcode {
        self.message.opcode()
    }

    /// Transaction ID
    pub fn xid(&self) -> u32 {
        self.message.xid()
    }

    pub fn ciaddr(&self) -> Ipv4Addr {
        self.message.ciaddr()
    }

    pub fn yiaddr(&self) -> Ipv4Addr {
        self.message.yiaddr()
    }

    pub fn siaddr(&self) -> Ipv4Addr {
        self.message.siaddr()
    }

    pub fn giaddr(&self) -> Ipv4Addr {
        self.message.giaddr()
    }

    pub fn set_ciaddr(&mut self, addr: Ipv4Addr) {
        self.message.set_ciaddr(addr);
    }

    pub fn set_yiaddr(&mut self, addr: Ipv4Addr) {
        self.message.set_yiaddr(addr);
    }

    pub fn set_siaddr(&mut self, addr: Ipv4Addr) {
        self.message.set_siaddr(addr);
    }

    pub fn set_giaddr(&mut self, addr: Ipv4Addr) {
        self.message.set_giaddr(addr);
    }

    pub fn message_type(&self) -> Option<MessageType> {
        match self.get(OptionCode::MessageType)? {
            DhcpOption::MessageType(t) => Some(t.clone()),
            _ => None,
        }
    }

    /// Client MAC, when the hardware address is Ethernet-sized
    pub fn mac(&self) -> Option<MacAddr> {
        if self.message.hlen() != 6 {
            return None;
        }
        MacAddr::from_chaddr(self.message.chaddr())
    }

    /// Option 50
    pub fn requested_ip(&self) -> Option<Ipv4Addr> {
        match self.get(OptionCode::RequestedIpAddress)? {
            DhcpOption::RequestedIpAddress(ip) => Some(*ip),
            _ => None,
        }
    }

    /// Option 60
    pub fn class_identifier(&self) -> Option<&[u8]> {
        self.raw_option(OptionCode::ClassIdentifier)
    }

    /// Option 77
    pub fn user_class(&self) -> Option<&[u8]> {
        self.raw_option(OptionCode::UserClass)
    }

    /// Option 97
    pub fn client_machine_id(&self) -> Option<&[u8]> {
        self.raw_option(OptionCode::ClientMachineIdentifier)
    }

    /// Option 43
    pub fn vendor_extensions(&self) -> Option<&[u8]> {
        self.raw_option(OptionCode::VendorExtensions)
    }

    /// First architecture in option 93
    pub fn client_arch(&self) -> Option<u16> {
        match self.get(OptionCode::ClientSystemArchitecture)? {
            DhcpOption::ClientSystemArchitecture(arch) => Some(u16::from(*arch)),
            DhcpOption::Unknown(opt) => match opt.data() {
                [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
                _ => None,
            },
            _ => None,
        }
    }

    /// Byte-valued options, including ones kept as unknown because their
    /// typed form failed to decode
    fn raw_option(&self, code: OptionCode) -> Option<&[u8]> {
        match self.get(code)? {
            DhcpOption::ClassIdentifier(v)
            | DhcpOption::UserClass(v)
            | DhcpOption::ClientMachineIdentifier(v)
            | DhcpOption::VendorExtensions(v)
            | DhcpOption::BootfileName(v) => Some(v.as_slice()),
            DhcpOption::Unknown(opt) => Some(opt.data()),
            _ => None,
        }
    }

    /// Set the boot file name. Names that do not fit the legacy 128-byte
    /// header field go in option 67 instead.
    pub fn set_boot_file(&mut self, name: &str) {
        if name.len() < FILE_LEN {
            self.message.set_fname_str(name);
        } else {
            self.insert(DhcpOption::BootfileName(name.as_bytes().to_vec()));
        }
    }

    /// Boot file name from the header, falling back to option 67
    pub fn boot_file(&self) -> String {
        let fname = self.message.fname().map(c_string).unwrap_or_default();
        if !fname.is_empty() {
            return fname;
        }
        self.raw_option(OptionCode::BootfileName)
            .map(c_string)
            .unwrap_or_default()
    }

    /// Parse a message from a received datagram.
    ///
    /// A typed option whose value does not match its expected shape is
    /// kept as an unknown option instead of failing the whole message.
    pub fn decode(data: &[u8]) -> Result<Self> {
        match Message::from_bytes(data) {
            Ok(message) => Ok(Self { message }),
            Err(e) if has_options_area(data) => {
                debug!(error = %e, "Typed option decode failed, decoding options one by one");
                Self::decode_lenient(data)
            }
            Err(e) => Err(DhcpError::ParseError(e.to_string())),
        }
    }

    fn decode_lenient(data: &[u8]) -> Result<Self> {
        let mut header = data[..OPTIONS_OFFSET].to_vec();
        header.push(OPT_END);
        let mut message =
            Message::from_bytes(&header).map_err(|e| DhcpError::ParseError(e.to_string()))?;

        for (code, value) in raw_options(&data[OPTIONS_OFFSET..])? {
            message.opts_mut().insert(decode_option(code, value));
        }
        Ok(Self { message })
    }

    /// Serialize to wire format, padded to [`MIN_MESSAGE_LEN`]
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = self
            .message
            .to_vec()
            .map_err(|e| DhcpError::EncodeError(e.to_string()))?;
        if buf.len() < MIN_MESSAGE_LEN {
            buf.resize(MIN_MESSAGE_LEN, 0);
        }
        Ok(buf)
    }
}

fn has_options_area(data: &[u8]) -> bool {
    data.len() > OPTIONS_OFFSET && data[BOOTP_HEADER_LEN..OPTIONS_OFFSET] == MAGIC_COOKIE
}

/// Code and value of every option up to END. Repeated codes are joined
/// in order (RFC 3396).
fn raw_options(mut data: &[u8]) -> Result<Vec<(u8, Vec<u8>)>> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    while let Some((&code, rest)) = data.split_first() {
        match code {
            OPT_PAD => {
                data = rest;
                continue;
            }
            OPT_END => break,
            _ => {}
        }
        let (&len, rest) = rest
            .split_first()
            .ok_or_else(|| DhcpError::truncated(&format!("option {code}")))?;
        let value = rest
            .get(..len as usize)
            .ok_or_else(|| DhcpError::truncated(&format!("option {code}")))?;
        match out.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => existing.extend_from_slice(value),
            None => out.push((code, value.to_vec())),
        }
        data = &rest[len as usize..];
    }
    Ok(out)
}

fn decode_option(code: u8, value: Vec<u8>) -> DhcpOption {
    if let Ok(len) = u8::try_from(value.len()) {
        let mut tlv = Vec::with_capacity(value.len() + 2);
        tlv.push(code);
        tlv.push(len);
        tlv.extend_from_slice(&value);
        if let Ok(opt) = DhcpOption::from_bytes(&tlv) {
            return opt;
        }
    }
    debug!(code, len = value.len(), "Keeping undecodable option as unknown");
    DhcpOption::Unknown(UnknownOption::new(OptionCode::from(code), value))
}

fn c_string(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
