//! Domain types for the SGQR payload model.
//!
//! Contains the validated `Tag` newtype, the recursive `DataElement` tree,
//! the `SgqrConfig` input record with its nested templates, the assembly and
//! parse option structs, and the final `QrPayload` wrapper.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::template::{DataField, PaymentSystemTemplate, SgqrIdTemplate};

// ==============================================================================
// Tag
// ==============================================================================

/// A two-digit data element tag, `00` through `99`.
///
/// Tags render as exactly two zero-padded ASCII digits, which is also the
/// serde representation (`"07"`, `"26"`), so configuration files keep the
/// string spelling the payload format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(u8);

impl Tag {
    /// Validating constructor for runtime tag values.
    pub fn new(value: u8) -> Result<Self, PayloadError> {
        if value > 99 {
            return Err(PayloadError::TagOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Const constructor for the well-known tags in `schema`.
    /// Panics at compile time if the value is not representable.
    pub(crate) const fn known(value: u8) -> Self {
        assert!(value <= 99);
        Self(value)
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl std::str::FromStr for Tag {
    type Err = PayloadError;

    /// Tags are spelled as exactly two ASCII digits; `"7"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
            return Err(PayloadError::InvalidTag { found: s.into() });
        }
        Self::new((bytes[0] - b'0') * 10 + (bytes[1] - b'0'))
    }
}

impl TryFrom<String> for Tag {
    type Error = PayloadError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

// ==============================================================================
// Data Elements
// ==============================================================================

/// One node of the payload tree.
///
/// A `Leaf` holds an opaque text value; a `Group` holds the decoded inner
/// elements of a nested template (SGQR-ID, payment-system, additional-data).
/// Nesting depth in SGQR payloads is exactly one level, but the codec treats
/// the structure uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataElement {
    Leaf { tag: Tag, value: String },
    Group { tag: Tag, elements: Vec<DataElement> },
}

impl DataElement {
    #[must_use]
    pub fn leaf(tag: Tag, value: impl Into<String>) -> Self {
        Self::Leaf {
            tag,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn group(tag: Tag, elements: Vec<DataElement>) -> Self {
        Self::Group { tag, elements }
    }

    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Leaf { tag, .. } | Self::Group { tag, .. } => *tag,
        }
    }
}

// ==============================================================================
// Initiation Method
// ==============================================================================

/// Point of initiation method: whether the code is printed once and reused
/// (`Static`, code `"11"`) or generated per transaction (`Dynamic`, `"12"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiationMethod {
    #[default]
    #[serde(rename = "11", alias = "static")]
    Static,
    #[serde(rename = "12", alias = "dynamic")]
    Dynamic,
}

impl InitiationMethod {
    /// The two-digit wire code carried under tag 01.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Static => "11",
            Self::Dynamic => "12",
        }
    }
}

impl std::fmt::Display for InitiationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ==============================================================================
// Overflow Policy
// ==============================================================================

/// What the assembler does when the finished payload exceeds the length
/// ceiling. `Reject` fails outright; the drop policies shed optional content
/// in a fixed order and fail only if the payload still does not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    #[default]
    Reject,
    /// Drop the additional-data block, then the postal code, then the amount.
    DropOptional,
    /// Drop payment-system blocks from the end of the configured list.
    DropPaymentSystems,
}

// ==============================================================================
// Configuration Record
// ==============================================================================

/// The merchant configuration a payload is assembled from.
///
/// Field names match the JSON configuration file format. Key presence is
/// enforced by deserialization; semantic emptiness (an empty merchant name,
/// say) is caught by the assembler's mandatory-field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgqrConfig {
    pub merchant_name: String,
    pub merchant_city: String,
    /// ISO 18245 merchant category code, four digits.
    pub merchant_category_code: String,
    /// ISO 4217 numeric currency code; `"702"` is SGD.
    pub currency: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Transaction amount as its exact wire text, e.g. `"7.50"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_postal_code: Option<String>,
    #[serde(default)]
    pub initiation_method: InitiationMethod,
    pub sgqr_id: SgqrIdTemplate,
    #[serde(default)]
    pub payment_systems: Vec<PaymentSystemTemplate>,
    #[serde(default)]
    pub additional_data: Vec<DataField>,
}

// ==============================================================================
// Assembly and Parse Options
// ==============================================================================

/// Default payload length ceiling, sized for comfortable QR rendering.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 512;

/// Knobs for the assembler that are about the payload, not the merchant.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Maximum length of the finished payload text in bytes.
    pub max_payload_len: usize,
    /// Top-level tag carrying the SGQR-ID block.
    pub sgqr_id_tag: Tag,
    pub overflow_policy: OverflowPolicy,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            sgqr_id_tag: crate::schema::SGQR_ID,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

/// Knobs for the parser; only the SGQR-ID tag placement is configurable.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Top-level tag expanded as the SGQR-ID block.
    pub sgqr_id_tag: Tag,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sgqr_id_tag: crate::schema::SGQR_ID,
        }
    }
}

// ==============================================================================
// Assembled Payload
// ==============================================================================

/// A finished, checksummed payload. Only the assembler constructs these,
/// so holding one means the text round-tripped through the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    text: String,
}

impl QrPayload {
    pub(crate) fn new(text: String) -> Self {
        Self { text }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes, reported alongside the text for QR renderers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for QrPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
