//! Hex-encoded identifiers used by console clients.
//!
//! Clients send every identifier as a hex string. The newtypes parse on the way
//! in and render with fixed-width uppercase hex on the way out, so the same
//! identifier always compares and prints the same way.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! define_hex_id {
    ($name:ident, $inner:ty, $width:literal, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name($inner);

        impl $name {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            pub const fn value(self) -> $inner {
                self.0
            }

            /// Parse a hex string, with or without a `0x` prefix.
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let trimmed = raw.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                if digits.is_empty() || digits.len() > $width {
                    return Err(DomainError::invalid_id(format!(
                        "{} must be 1-{} hex digits, got '{}'",
                        $label, $width, raw
                    )));
                }
                <$inner>::from_str_radix(digits, 16)
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{} '{}': {}", $label, raw, e)))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:0width$X}", self.0, width = $width)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

define_hex_id!(TitleId, u32, 8, "Title ID");
define_hex_id!(SessionId, u64, 16, "Session ID");
define_hex_id!(Xuid, u64, 16, "XUID");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_id_renders_as_padded_uppercase_hex() {
        let id = TitleId::new(0x4d5307e6);
        assert_eq!(id.to_string(), "4D5307E6");
        assert_eq!(TitleId::new(0x1).to_string(), "00000001");
    }

    #[test]
    fn parse_accepts_prefix_and_lowercase() {
        assert_eq!(TitleId::parse("0x4d5307e6").unwrap(), TitleId::new(0x4D5307E6));
        assert_eq!(
            Xuid::parse("0009000006f93463").unwrap(),
            Xuid::new(0x0009_0000_06F9_3463)
        );
    }

    #[test]
    fn parse_rejects_garbage_and_overlong_input() {
        assert!(TitleId::parse("").is_err());
        assert!(TitleId::parse("not-hex").is_err());
        assert!(TitleId::parse("123456789").is_err());
        assert!(SessionId::parse("00000000000000001").is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let xuid = Xuid::new(0xE000_0000_0000_0001);
        let json = serde_json::to_string(&xuid).unwrap();
        assert_eq!(json, "\"E000000000000001\"");

        let back: Xuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, xuid);
        assert!(serde_json::from_str::<Xuid>("\"zz\"").is_err());
    }
}
