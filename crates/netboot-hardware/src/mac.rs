//! Hardware address type

use crate::error::DirectoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 48-bit Ethernet hardware address
///
/// Parses colon or dash separated hex (`aa:bb:cc:dd:ee:ff`,
/// `AA-BB-CC-DD-EE-FF`) and always displays as lower-case colon form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Take the first six bytes of a DHCP `chaddr` field
    pub fn from_chaddr(chaddr: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = chaddr.get(..6)?.try_into().ok()?;
        Some(Self(octets))
    }

    /// Dash separated form, as used by the `ipam=` kernel parameter
    pub fn to_dashed(&self) -> String {
        self.to_string().replace(':', "-")
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DirectoryError::InvalidMac(s.to_string());

        let sep = if s.contains(':') { ':' } else { '-' };
        let mut octets = [0u8; 6];
        let mut parts = s.split(sep);
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddr {
    type Error = DirectoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_and_dash() {
        let a: MacAddr = "de:ed:be:ef:fe:ed".parse().unwrap();
        let b: MacAddr = "DE-ED-BE-EF-FE-ED".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.octets(), [0xde, 0xed, 0xbe, 0xef, 0xfe, 0xed]);
        assert_eq!(a.to_string(), "de:ed:be:ef:fe:ed");
        assert_eq!(a.to_dashed(), "de-ed-be-ef-fe-ed");
    }

    #[test]
    fn test_parse_invalid() {
        for bad in [
            "",
            "invalid",
            "00:11:22:33:44",
            "00:11:22:33:44:55:66",
            "0:11:22:33:44:55",
            "zz:11:22:33:44:55",
            "00:11-22:33:44:55",
        ] {
            assert!(
                matches!(bad.parse::<MacAddr>(), Err(DirectoryError::InvalidMac(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_from_chaddr() {
        let chaddr = [1, 2, 3, 4, 5, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mac = MacAddr::from_chaddr(&chaddr).unwrap();
        assert_eq!(mac.to_string(), "01:02:03:04:05:06");
        assert!(MacAddr::from_chaddr(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let mac = MacAddr::new([0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"00:11:22:33:44:55\"");
        let parsed: MacAddr = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mac);
        assert!(serde_json::from_str::<MacAddr>("\"nope\"").is_err());
    }
}
