//! Validated primitive types shared across the Dority workspace.
//!
//! Values of these types are checked once at the boundary (HTTP body, CLI argument) and can be
//! passed inward without re-validation.

/// Errors that can occur when constructing validated types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The input was empty or contained only whitespace.
    #[error("id cannot be empty")]
    Empty,

    /// The input is longer than the type allows.
    #[error("value exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// The input contains a character outside the allowed set.
    #[error("invalid character {0:?} in resource id")]
    InvalidCharacter(char),
}

/// A FHIR logical resource id.
///
/// FHIR restricts ids to 1-64 characters drawn from `A-Z`, `a-z`, `0-9`, `-` and `.`.
/// Surrounding whitespace is trimmed before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Maximum length of a FHIR logical id.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a FHIR logical id.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError`] if the trimmed input is empty, longer than
    /// [`ResourceId::MAX_LEN`], or contains a character outside the FHIR id alphabet.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(TypeError::TooLong { max: Self::MAX_LEN });
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(TypeError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_accepts_fhir_alphabet() {
        let id = ResourceId::parse(" patient-001 ").unwrap();
        assert_eq!(id.as_str(), "patient-001");
        assert!(ResourceId::parse("a.B-9").is_ok());
    }

    #[test]
    fn resource_id_rejects_blank() {
        assert_eq!(ResourceId::parse("  "), Err(TypeError::Empty));
    }

    #[test]
    fn resource_id_rejects_path_characters() {
        assert_eq!(
            ResourceId::parse("../Patient"),
            Err(TypeError::InvalidCharacter('/'))
        );
        assert_eq!(
            ResourceId::parse("abc?x=1"),
            Err(TypeError::InvalidCharacter('?'))
        );
    }

    #[test]
    fn resource_id_rejects_overlong() {
        let long = "a".repeat(65);
        assert_eq!(
            ResourceId::parse(&long),
            Err(TypeError::TooLong { max: 64 })
        );
        assert!(ResourceId::parse(&"a".repeat(64)).is_ok());
    }
}
