//! Strongly-typed identifiers used across the domain.
//!
//! All of these are short SMS-facing strings, so they normalize case on
//! construction and validate length/charset once, at the boundary.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Unique short username of a retailer/contact. Normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alias(String);

/// Product abbreviation, max 4 characters. Normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

/// Organization abbreviation, max 4 characters. Normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationCode(String);

/// Device serial number as printed on the physical unit.
///
/// Storage accepts up to 14 characters; the sale command parser additionally
/// enforces the printed 7-character form. Normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal, $max:expr, $upper:expr) => {
        impl $t {
            pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
                let raw = raw.as_ref().trim();
                if raw.is_empty() {
                    return Err(DomainError::validation_one(concat!($name, " cannot be empty")));
                }
                if raw.len() > $max {
                    return Err(DomainError::validation_one(format!(
                        "{} must be at most {} characters",
                        $name, $max
                    )));
                }
                if raw.chars().any(char::is_whitespace) {
                    return Err(DomainError::validation_one(concat!(
                        $name,
                        " cannot contain spaces"
                    )));
                }
                let normalized = if $upper {
                    raw.to_uppercase()
                } else {
                    raw.to_lowercase()
                };
                Ok(Self(normalized))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl ValueObject for $t {}
    };
}

impl_code_newtype!(Alias, "alias", 12, false);
impl_code_newtype!(ProductCode, "product code", 4, true);
impl_code_newtype!(OrganizationCode, "organization code", 4, true);
impl_code_newtype!(SerialNumber, "serial number", 14, true);

impl SerialNumber {
    /// Leading alphabetic run of the serial, which encodes the product code
    /// printed into the device serial (`EW00001` → `EW`).
    pub fn alpha_prefix(&self) -> &str {
        let end = self
            .0
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}
