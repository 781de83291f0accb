use crate::{IdError, IdResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Identifier for a suggested clinical action.
///
/// Always displayed in canonical form: 32 lowercase hexadecimal characters, no hyphens.
/// This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(Uuid);

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionId {
    /// Generates a new random action id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an action id that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised, so the same action
    /// can never be addressed by two different strings.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> IdResult<Self> {
        if !Self::is_canonical(input) {
            return Err(IdError::InvalidInput(format!(
                "action id must be 32 lowercase hex characters without hyphens, got: '{input}'"
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| IdError::InvalidInput(e.to_string()))
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ActionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ActionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ActionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ActionId::parse(&s).map_err(serde::de::Error::custom)
    }
}
