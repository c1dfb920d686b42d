//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// 64-bit id of the first individual account in the public universe.
const INDIVIDUAL_BASE: u64 = 76_561_197_960_265_728;

/// Identifier of an individual account on the platform.
///
/// Accepts the three textual forms the platform hands out:
/// - 64-bit: `76561197960287930`
/// - legacy: `STEAM_0:0:11101`
/// - bracketed: `[U:1:22202]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an AccountId from the 32-bit account number.
    pub fn from_account_number(account_number: u32) -> Self {
        Self(INDIVIDUAL_BASE + u64::from(account_number))
    }

    /// Creates an AccountId from a 64-bit id, rejecting non-individual ids.
    pub fn from_id64(id64: u64) -> Result<Self, ValidationError> {
        if id64 < INDIVIDUAL_BASE || id64 - INDIVIDUAL_BASE > u64::from(u32::MAX) {
            return Err(ValidationError::invalid_format(
                "account_id",
                format!("{} is not an individual account id", id64),
            ));
        }
        Ok(Self(id64))
    }

    /// Returns the 64-bit representation.
    pub fn id64(&self) -> u64 {
        self.0
    }

    /// Returns the 32-bit account number.
    pub fn account_number(&self) -> u32 {
        (self.0 - INDIVIDUAL_BASE) as u32
    }

    fn parse_legacy(body: &str) -> Option<Self> {
        let mut parts = body.split(':');
        let _universe: u8 = parts.next()?.parse().ok()?;
        let low_bit: u32 = parts.next()?.parse().ok()?;
        let high: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() || low_bit > 1 {
            return None;
        }
        high.checked_mul(2)
            .and_then(|n| n.checked_add(low_bit))
            .map(Self::from_account_number)
    }

    fn parse_bracketed(body: &str) -> Option<Self> {
        let mut parts = body.split(':');
        if parts.next()? != "U" {
            return None;
        }
        let _universe: u8 = parts.next()?.parse().ok()?;
        let account_number: u32 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::from_account_number(account_number))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for AccountId {
    type Error = ValidationError;

    fn try_from(id64: u64) -> Result<Self, Self::Error> {
        Self::from_id64(id64)
    }
}

impl From<AccountId> for u64 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::empty_field("account_id"));
        }

        let parsed = if let Some(body) = s.strip_prefix("STEAM_") {
            Self::parse_legacy(body)
        } else if let Some(body) = s.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
            Self::parse_bracketed(body)
        } else {
            return s
                .parse::<u64>()
                .map_err(|_| ValidationError::invalid_format("account_id", "unrecognised id format"))
                .and_then(Self::from_id64);
        };

        parsed.ok_or_else(|| ValidationError::invalid_format("account_id", "unrecognised id format"))
    }
}

/// Session identifier issued by the platform alongside the session cookies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId, rejecting empty values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a community group (numeric gid or vanity name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a GroupId, rejecting empty values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("group_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a shared file (workshop item, screenshot, artwork).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedFileId(pub u64);

impl fmt::Display for SharedFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a comment posted on a shared file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application (game) id used to scope inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub u32);

/// Inventory context within an application (2 = in-game items, 6 = cards...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);
