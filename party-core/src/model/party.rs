use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Short human-shareable party code handed out by the relay.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(into = "String", try_from = "String")]
pub struct PartyCode(String);

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("party code is blank")]
pub struct BlankPartyCode;

impl PartyCode {
    /// Parses user input. Surrounding whitespace is ignored, blank input is rejected.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PartyCode {
    type Error = BlankPartyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(BlankPartyCode)
    }
}

impl From<PartyCode> for String {
    fn from(code: PartyCode) -> Self {
        code.0
    }
}

impl fmt::Display for PartyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartyRole {
    #[default]
    None,
    Host,
    Joiner,
}
