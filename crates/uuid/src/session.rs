use crate::{IdError, IdResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::{fmt, str::FromStr};

const PREFIX: &str = "session-";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier for a clinical session.
///
/// Format: `session-<unix-millis>-<suffix>` where `suffix` is nine characters from `[0-9a-z]`.
///
/// Example: `session-1767225600000-k3j9x0q2a`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId {
    millis: i64,
    suffix: String,
}

impl SessionId {
    /// Generates a session id for the current instant using the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// Generates a session id for `now` using the supplied RNG.
    pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self {
            millis: now.timestamp_millis(),
            suffix,
        }
    }

    /// Parses a session id that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if the prefix, timestamp or suffix is malformed.
    pub fn parse(input: &str) -> IdResult<Self> {
        let invalid = || {
            IdError::InvalidInput(format!(
                "session id must look like 'session-<millis>-<9 base36 chars>', got: '{input}'"
            ))
        };

        let rest = input.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (millis, suffix) = rest.split_once('-').ok_or_else(invalid)?;

        if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let millis: i64 = millis.parse().map_err(|_| invalid())?;

        if suffix.len() != SUFFIX_LEN
            || !suffix
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z'))
        {
            return Err(invalid());
        }

        Ok(Self {
            millis,
            suffix: suffix.to_owned(),
        })
    }

    /// Returns the creation instant encoded in the id, if it is representable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.millis)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}-{}", self.millis, self.suffix)
    }
}

impl FromStr for SessionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SessionId::parse(&s).map_err(serde::de::Error::custom)
    }
}
