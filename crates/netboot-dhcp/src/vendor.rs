//! Vendor-specific information (option 43)
//!
//! Option 43 carries a list of tagged sub-options. PXE clients read the
//! discovery-control sub-option from it; the boot chain also reads a
//! trace context sub-option so later HTTP requests can be correlated with
//! the DHCP exchange that started them.

use crate::error::{DhcpError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// PXE_DISCOVERY_CONTROL sub-option tag
pub const PXE_DISCOVERY_CONTROL: u8 = 6;

/// Trace context sub-option tag
pub const TRACE_CONTEXT: u8 = 69;

/// Skip boot server discovery and use the boot file name from the reply
pub const DISCOVERY_USE_BOOTFILE: u8 = 0x08;

const SUBOPT_PAD: u8 = 0;
const SUBOPT_END: u8 = 255;

/// Ordered list of tagged sub-options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorOptions {
    entries: Vec<(u8, Bytes)>,
}

impl VendorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`VendorOptions::set`]
    pub fn with(mut self, tag: u8, value: impl Into<Bytes>) -> Self {
        self.set(tag, value);
        self
    }

    /// Set `tag`, replacing an earlier value in place
    pub fn set(&mut self, tag: u8, value: impl Into<Bytes>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    pub fn get(&self, tag: u8) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_ref())
    }

    pub fn tags(&self) -> Vec<u8> {
        self.entries.iter().map(|(t, _)| *t).collect()
    }

    /// Tag/length/value for each entry followed by the END tag
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        for (tag, value) in &self.entries {
            if *tag == SUBOPT_PAD || *tag == SUBOPT_END {
                return Err(DhcpError::EncodeError(format!(
                    "vendor sub-option tag {tag} is reserved"
                )));
            }
            let len = u8::try_from(value.len()).map_err(|_| {
                DhcpError::EncodeError(format!(
                    "vendor sub-option {tag} is {} bytes, limit is 255",
                    value.len()
                ))
            })?;
            buf.put_u8(*tag);
            buf.put_u8(len);
            buf.put_slice(value);
        }
        buf.put_u8(SUBOPT_END);
        Ok(buf.freeze())
    }
}

/// W3C trace context in its 26-byte binary form:
/// version, 16-byte trace id, 8-byte span id, flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceToken {
    pub trace_id: [u8; 16],
    pub span_id: [u8; 8],
    pub flags: u8,
}

impl TraceToken {
    pub const LEN: usize = 26;
    const VERSION: u8 = 0;
    const SAMPLED: u8 = 0x01;

    /// Fresh random ids, sampled
    pub fn generate() -> Self {
        Self {
            trace_id: rand::random(),
            span_id: rand::random(),
            flags: Self::SAMPLED,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0] = Self::VERSION;
        out[1..17].copy_from_slice(&self.trace_id);
        out[17..25].copy_from_slice(&self.span_id);
        out[25] = self.flags;
        out
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() != Self::LEN || data[0] != Self::VERSION {
            return None;
        }
        let mut token = Self {
            trace_id: [0; 16],
            span_id: [0; 8],
            flags: data[25],
        };
        token.trace_id.copy_from_slice(&data[1..17]);
        token.span_id.copy_from_slice(&data[17..25]);
        Some(token)
    }
}

impl fmt::Display for TraceToken {
    /// `traceparent` header form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}-", Self::VERSION)?;
        for b in self.trace_id {
            write!(f, "{b:02x}")?;
        }
        write!(f, "-")?;
        for b in self.span_id {
            write!(f, "{b:02x}")?;
        }
        write!(f, "-{:02x}", self.flags)
    }
}

/// Option 43 payload for a PXE reply: discovery control plus trace context
pub fn pxe_vendor_options(trace: &TraceToken) -> VendorOptions {
    VendorOptions::new()
        .with(PXE_DISCOVERY_CONTROL, vec![DISCOVERY_USE_BOOTFILE])
        .with(TRACE_CONTEXT, trace.to_bytes().to_vec())
}
