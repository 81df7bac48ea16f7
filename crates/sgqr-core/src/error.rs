use crate::types::Tag;

/// Errors produced by the payload engine.
///
/// Every variant carries enough context to locate the offending element:
/// the tag, the byte offset into the payload text, or the label of the
/// payment-system template involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("value under tag {tag} has byte {found:#04x} at position {position}, outside printable ASCII (0x20..=0x7E)")]
    CharsetViolation { tag: Tag, found: u8, position: usize },

    #[error("value under tag {tag} is {len} bytes; the two-digit length field caps values at 99")]
    LengthOverflow { tag: Tag, len: usize },

    #[error("truncated payload at offset {offset}: element needs {needed} bytes, {remaining} remain")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("tag field at offset {offset} is not two ASCII digits: {found:?}")]
    InvalidTagField { offset: usize, found: String },

    #[error("length field at offset {offset} is not two ASCII digits: {found:?}")]
    InvalidLengthField { offset: usize, found: String },

    #[error("tag value {value} is outside the representable range 00-99")]
    TagOutOfRange { value: u8 },

    #[error("malformed tag {found:?}: expected two ASCII digits")]
    InvalidTag { found: String },

    #[error("payment-system tag {tag} requested by {second:?} is already held by {first:?}")]
    TagCollision {
        tag: Tag,
        first: String,
        second: String,
    },

    #[error("no free payment-system tag left in 26-50 for template {template:?}")]
    AllocationExhausted { template: String },

    #[error("template {template:?} prefers tag {tag}, outside the payment-system range 26-50")]
    PreferredTagOutOfRange { template: String, tag: Tag },

    #[error("template {template:?} sets reserved inner tag {tag} (00 carries the global identifier)")]
    ReservedInnerTag { template: String, tag: Tag },

    #[error("template {template:?} lists inner tag {tag} more than once")]
    DuplicateInnerTag { template: String, tag: Tag },

    #[error("mandatory field {field} is missing or empty")]
    MissingMandatoryField { field: &'static str },

    #[error("payload is {len} bytes, over the {max}-byte limit")]
    PayloadTooLong { len: usize, max: usize },

    #[error("checksum mismatch: payload declares {declared:?}, computed {computed:?}")]
    ChecksumMismatch { declared: String, computed: String },
}
