use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a pre-negotiated data channel.
///
/// Both sides of a connection create their channel with the same identifier,
/// so no in-band "channel offered" message is needed. SCTP stream 65535 is
/// reserved, which bounds the usable range to `0..=65534`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ChannelId(u16);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("channel id {0} is outside the negotiable range 0..={max}", max = ChannelId::MAX)]
pub struct InvalidChannelId(pub String);

impl ChannelId {
    pub const MAX: u16 = 65534;

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u64> for ChannelId {
    type Error = InvalidChannelId;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match u16::try_from(value) {
            Ok(id) if id <= Self::MAX => Ok(Self(id)),
            _ => Err(InvalidChannelId(value.to_string())),
        }
    }
}

impl From<ChannelId> for u64 {
    fn from(id: ChannelId) -> Self {
        u64::from(id.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A channel id exactly as the relay sent it.
///
/// The relay may hand out negative numbers, strings or nothing at all, so
/// decoding never fails on this field. Validation happens when the id is
/// turned into a [`ChannelId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawChannelId(serde_json::Value);

impl From<u64> for RawChannelId {
    fn from(value: u64) -> Self {
        Self(value.into())
    }
}

impl From<&str> for RawChannelId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<serde_json::Value> for RawChannelId {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

impl TryFrom<&RawChannelId> for ChannelId {
    type Error = InvalidChannelId;

    fn try_from(raw: &RawChannelId) -> Result<Self, Self::Error> {
        match raw.0.as_u64() {
            Some(value) => ChannelId::try_from(value),
            None => Err(InvalidChannelId(raw.to_string())),
        }
    }
}

impl fmt::Display for RawChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
