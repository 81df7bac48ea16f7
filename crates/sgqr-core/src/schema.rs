//! The EMV-style top-level tag layout, human-readable field names, and the
//! annotated parse tree (`DescribedElement`) used for structure dumps.
//!
//! Field names and reference notes follow the published SGQR specification
//! sheet so parsed payloads can be read without the document at hand.

use serde::Serialize;

use crate::codec;
use crate::types::{DataElement, Tag};

// ==============================================================================
// Well-Known Tags
// ==============================================================================

pub const FORMAT_INDICATOR: Tag = Tag::known(0);
pub const INITIATION_METHOD: Tag = Tag::known(1);
/// Default top-level tag of the SGQR-ID block.
pub const SGQR_ID: Tag = Tag::known(51);
pub const MERCHANT_CATEGORY_CODE: Tag = Tag::known(52);
pub const TRANSACTION_CURRENCY: Tag = Tag::known(53);
pub const TRANSACTION_AMOUNT: Tag = Tag::known(54);
pub const COUNTRY_CODE: Tag = Tag::known(58);
pub const MERCHANT_NAME: Tag = Tag::known(59);
pub const MERCHANT_CITY: Tag = Tag::known(60);
pub const POSTAL_CODE: Tag = Tag::known(61);
pub const ADDITIONAL_DATA: Tag = Tag::known(62);
pub const CRC: Tag = Tag::known(63);

/// Fixed value of the payload format indicator.
pub const FORMAT_INDICATOR_VALUE: &str = "01";

/// Bounds of the payment-system merchant account range.
pub const PAYMENT_SYSTEM_MIN: u8 = 26;
pub const PAYMENT_SYSTEM_MAX: u8 = 50;

#[must_use]
pub fn is_payment_system_tag(tag: Tag) -> bool {
    (PAYMENT_SYSTEM_MIN..=PAYMENT_SYSTEM_MAX).contains(&tag.as_u8())
}

// ==============================================================================
// Field Names
// ==============================================================================

/// Name of a top-level data element. The SGQR-ID placement is configurable,
/// so the caller says which tag carries it.
#[must_use]
pub fn root_field_name(tag: Tag, sgqr_id_tag: Tag) -> &'static str {
    if tag == sgqr_id_tag {
        return "SGQR ID";
    }
    if is_payment_system_tag(tag) {
        return "Merchant Account Information";
    }
    match tag.as_u8() {
        0 => "Payload Format Indicator",
        1 => "Point of Initiation Method",
        2 => "Visa",
        4 => "Mastercard",
        11 | 12 => "American Express",
        15 => "UnionPay",
        51 => "Merchant Account Information",
        52 => "Merchant Category Code",
        53 => "Transaction Currency",
        54 => "Transaction Amount",
        55 => "Tip or Convenience Indicator",
        56 => "Value of Convenience Fee Fixed",
        57 => "Value of Convenience Fee Percentage",
        58 => "Country Code",
        59 => "Merchant Name",
        60 => "Merchant City",
        61 => "Postal Code",
        62 => "Additional Data Field Template",
        63 => "CRC",
        64 => "Merchant Information Language Template",
        _ => "Unknown Field",
    }
}

fn sgqr_subfield_name(tag: Tag) -> &'static str {
    match tag.as_u8() {
        0 => "Unique Identifier",
        1 => "SGQR ID Number",
        2 => "Version",
        3 => "Postal Code",
        4 => "Level Number",
        5 => "Unit Number",
        6 => "Miscellaneous",
        7 => "New Version Date",
        _ => "Payment network specific",
    }
}

fn payment_subfield_name(tag: Tag) -> &'static str {
    match tag.as_u8() {
        0 => "Globally Unique Identifier",
        _ => "Payment network specific",
    }
}

fn additional_subfield_name(tag: Tag) -> &'static str {
    match tag.as_u8() {
        1 => "Bill Number",
        2 => "Mobile Number",
        3 => "Store Label",
        4 => "Loyalty Number",
        5 => "Reference Label",
        6 => "Customer Label",
        7 => "Terminal Label",
        8 => "Purpose of Transaction",
        9 => "Additional Consumer Data Request",
        _ => "Payment System Specific",
    }
}

/// Reference note for a top-level element, where the specification sheet
/// has one worth repeating.
#[must_use]
pub fn reference_note(tag: Tag, sgqr_id_tag: Tag) -> Option<&'static str> {
    if tag == sgqr_id_tag {
        return Some(
            "Identifies each SGQR label; generated and modified only by the \
             SGQR Centralised Repository.",
        );
    }
    if is_payment_system_tag(tag) {
        return Some("Templates reserved for additional payment networks.");
    }
    match tag.as_u8() {
        0 => Some("Shall be the first data object in the QR code. Shall contain a value of 01."),
        1 => Some(
            "Value of 11 when the same QR code is shown for more than one transaction. \
             Value of 12 when a new QR code is shown for each transaction.",
        ),
        52 => Some("As defined by ISO 18245."),
        53 => Some("Three-digit numeric currency code as defined by ISO 4217. SGD is 702."),
        58 => Some("As defined by ISO 3166-1 alpha 2."),
        63 => Some(
            "Shall be the last data object in the QR code. Checksum per ISO/IEC 13239 \
             with polynomial 0x1021 and initial value 0xFFFF.",
        ),
        _ => None,
    }
}

// ==============================================================================
// Described Parse Tree
// ==============================================================================

/// A parse-tree node annotated for display: tag and length as they appear
/// on the wire, the field's name, and a reference note where the layout
/// defines one. Groups carry `elements` instead of a `value`.
#[derive(Debug, Clone, Serialize)]
pub struct DescribedElement {
    pub tag: String,
    pub name: &'static str,
    pub length: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<DescribedElement>,
}

#[derive(Clone, Copy)]
enum BlockKind {
    SgqrId,
    PaymentSystem,
    AdditionalData,
}

/// Annotate a parsed top-level element sequence.
#[must_use]
pub fn describe_elements(elements: &[DataElement], sgqr_id_tag: Tag) -> Vec<DescribedElement> {
    elements
        .iter()
        .map(|element| describe_root(element, sgqr_id_tag))
        .collect()
}

fn describe_root(element: &DataElement, sgqr_id_tag: Tag) -> DescribedElement {
    let tag = element.tag();
    let name = root_field_name(tag, sgqr_id_tag);
    let note = reference_note(tag, sgqr_id_tag);
    let length = format!("{:02}", codec::encoded_len(element) - 4);

    match element {
        DataElement::Leaf { value, .. } => DescribedElement {
            tag: tag.to_string(),
            name,
            length,
            value: Some(value.clone()),
            note,
            elements: Vec::new(),
        },
        DataElement::Group { elements, .. } => {
            let kind = if tag == sgqr_id_tag {
                BlockKind::SgqrId
            } else if tag == ADDITIONAL_DATA {
                BlockKind::AdditionalData
            } else {
                BlockKind::PaymentSystem
            };
            DescribedElement {
                tag: tag.to_string(),
                name,
                length,
                value: None,
                note,
                elements: elements
                    .iter()
                    .map(|child| describe_child(child, kind))
                    .collect(),
            }
        }
    }
}

fn describe_child(element: &DataElement, kind: BlockKind) -> DescribedElement {
    let tag = element.tag();
    let name = match kind {
        BlockKind::SgqrId => sgqr_subfield_name(tag),
        BlockKind::PaymentSystem => payment_subfield_name(tag),
        BlockKind::AdditionalData => additional_subfield_name(tag),
    };
    let value = match element {
        DataElement::Leaf { value, .. } => value.clone(),
        // Depth is one level; a nested group here would be a parser bug,
        // but render its raw encoding rather than panic.
        DataElement::Group { elements, .. } => {
            codec::encode_elements(elements).unwrap_or_default()
        }
    };
    DescribedElement {
        tag: tag.to_string(),
        name,
        length: format!("{:02}", codec::encoded_len(element) - 4),
        value: Some(value),
        note: None,
        elements: Vec::new(),
    }
}
