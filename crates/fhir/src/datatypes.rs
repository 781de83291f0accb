//! FHIR complex datatypes used by the `Patient` wire model.
//!
//! Only the elements read by the service are modelled. Every element is optional on the wire;
//! repeating elements default to empty.

use serde::{Deserialize, Serialize};

/// A name of a human (`HumanName`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<String>,
}

impl HumanName {
    /// Given names followed by the family name, space-joined and trimmed.
    ///
    /// Blank parts are skipped. Returns `None` when no part carries text.
    pub fn joined_parts(&self) -> Option<String> {
        let joined = self
            .given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }

    /// The first given name, if any.
    pub fn first_given(&self) -> Option<&str> {
        self.given
            .iter()
            .map(|g| g.trim())
            .find(|g| !g.is_empty())
    }
}

/// A phone, email or other contact point (`ContactPoint`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl ContactPoint {
    /// The trimmed value, or `None` if blank.
    pub fn non_blank_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn is_system(&self, system: &str) -> bool {
        self.system
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(system))
    }

    pub fn is_use(&self, use_type: &str) -> bool {
        self.use_type
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(use_type))
    }
}

/// A postal address (`Address`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn is_use(&self, use_type: &str) -> bool {
        self.use_type
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(use_type))
    }
}

/// A reference to a code defined by a terminology system (`Coding`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A concept that may be defined by codes and/or text (`CodeableConcept`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// True if any coding has exactly `code` (ASCII case-insensitive).
    pub fn has_code(&self, code: &str) -> bool {
        self.coding
            .iter()
            .filter_map(|c| c.code.as_deref())
            .any(|c| c.trim().eq_ignore_ascii_case(code))
    }

    /// True if the concept text, or any coding code or display, contains `needle`
    /// (case-insensitive). `needle` must be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.text
            .iter()
            .chain(self.coding.iter().flat_map(|c| c.code.iter().chain(c.display.iter())))
            .any(|s| s.to_lowercase().contains(needle))
    }

    /// The first non-blank coding display.
    pub fn first_display(&self) -> Option<&str> {
        self.coding
            .iter()
            .filter_map(|c| c.display.as_deref())
            .map(str::trim)
            .find(|d| !d.is_empty())
    }

    /// The first non-blank coding code.
    pub fn first_code(&self) -> Option<&str> {
        self.coding
            .iter()
            .filter_map(|c| c.code.as_deref())
            .map(str::trim)
            .find(|c| !c.is_empty())
    }

    /// The non-blank concept text.
    pub fn non_blank_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A reference from one resource to another (`Reference`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// The trimmed display text, or `None` if blank.
    pub fn non_blank_display(&self) -> Option<&str> {
        self.display
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// A business identifier such as an MRN (`Identifier`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_concept: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    pub fn non_blank_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
