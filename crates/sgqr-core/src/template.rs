//! Builders for the one-level nested blocks: the SGQR-ID block and the
//! payment-system merchant account blocks.
//!
//! Templates are configuration-side records; `to_element` turns them into
//! `Group` nodes for the codec. Inner tag discipline (00 reserved for the
//! global identifier, no duplicates) is checked before anything is encoded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::types::{DataElement, Tag};

/// Inner tag 00, reserved in every nested block for the scheme identifier.
const GLOBAL_IDENTIFIER_TAG: Tag = Tag::known(0);

/// Fixed identifier carried on inner tag 00 of the SGQR-ID block.
pub const SGQR_GLOBAL_IDENTIFIER: &str = "SG.SGQR";

// ==============================================================================
// Data Field
// ==============================================================================

/// A raw (tag, value) pair inside a nested block. Values are opaque to the
/// engine; their network-specific meaning lives in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    #[serde(alias = "id")]
    pub tag: Tag,
    pub value: String,
}

/// Shared inner-tag discipline for payment-system fields and the
/// additional-data block: tag 00 is reserved and no tag may repeat.
pub fn check_inner_tags(context: &str, fields: &[DataField]) -> Result<(), PayloadError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.tag == GLOBAL_IDENTIFIER_TAG {
            return Err(PayloadError::ReservedInnerTag {
                template: context.into(),
                tag: field.tag,
            });
        }
        if !seen.insert(field.tag) {
            return Err(PayloadError::DuplicateInnerTag {
                template: context.into(),
                tag: field.tag,
            });
        }
    }
    Ok(())
}

// ==============================================================================
// SGQR-ID Block
// ==============================================================================

/// The SGQR-ID block: the merchant's central-repository registration,
/// carried on fixed inner tags 00 through 07.
///
/// `sgqr_number` and `revision_date` identify a registration, so they are
/// required; the remaining sub-fields default to the repository's
/// placeholder values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgqrIdTemplate {
    /// Repository-assigned SGQR ID number.
    pub sgqr_number: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_postal_code")]
    pub postal_code: String,
    /// Floor level of the merchant's premises.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_misc")]
    pub misc: String,
    /// Date of the last registration revision, `YYYYMMDD`.
    pub revision_date: String,
}

fn default_version() -> String {
    "01.0001".into()
}

fn default_postal_code() -> String {
    "000000".into()
}

fn default_level() -> String {
    "01".into()
}

fn default_unit() -> String {
    "001".into()
}

fn default_misc() -> String {
    "0000".into()
}

impl SgqrIdTemplate {
    /// Build the block as a `Group` under `outer_tag`. Sub-fields sit on
    /// the reserved inner tags in fixed order behind the `SG.SGQR`
    /// identifier.
    #[must_use]
    pub fn to_element(&self, outer_tag: Tag) -> DataElement {
        DataElement::group(
            outer_tag,
            vec![
                DataElement::leaf(GLOBAL_IDENTIFIER_TAG, SGQR_GLOBAL_IDENTIFIER),
                DataElement::leaf(Tag::known(1), self.sgqr_number.as_str()),
                DataElement::leaf(Tag::known(2), self.version.as_str()),
                DataElement::leaf(Tag::known(3), self.postal_code.as_str()),
                DataElement::leaf(Tag::known(4), self.level.as_str()),
                DataElement::leaf(Tag::known(5), self.unit.as_str()),
                DataElement::leaf(Tag::known(6), self.misc.as_str()),
                DataElement::leaf(Tag::known(7), self.revision_date.as_str()),
            ],
        )
    }
}

// ==============================================================================
// Payment-System Block
// ==============================================================================

/// One payment-system merchant account block, destined for a top-level tag
/// in the 26-50 range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSystemTemplate {
    /// Informational label for logs and error messages; never emitted.
    #[serde(default, alias = "name")]
    pub display_name: String,
    /// Scheme identifier emitted on inner tag 00, e.g. `SG.PAYNOW`.
    pub global_identifier: String,
    /// Fixed top-level tag this system wants. Allocation fails loudly if
    /// the tag is already taken or outside 26-50.
    #[serde(default, alias = "preferred_id", skip_serializing_if = "Option::is_none")]
    pub preferred_tag: Option<Tag>,
    /// Network-specific fields on inner tags 01-99, emitted in listed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<DataField>,
}

impl PaymentSystemTemplate {
    /// Label for diagnostics: the display name when set, otherwise the
    /// global identifier.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.global_identifier
        } else {
            &self.display_name
        }
    }

    /// Check inner tag discipline before allocation or encoding happens.
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_inner_tags(self.label(), &self.fields)
    }

    /// Build the block as a `Group` under its allocated top-level tag.
    #[must_use]
    pub fn to_element(&self, tag: Tag) -> DataElement {
        let mut elements = Vec::with_capacity(self.fields.len() + 1);
        elements.push(DataElement::leaf(
            GLOBAL_IDENTIFIER_TAG,
            self.global_identifier.as_str(),
        ));
        for field in &self.fields {
            elements.push(DataElement::leaf(field.tag, field.value.as_str()));
        }
        DataElement::group(tag, elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_element;
    use crate::test_util::{field, paynow_template, sample_sgqr_id, tag};

    // -- SgqrIdTemplate tests -------------------------------------------------

    #[test]
    fn sgqr_id_fills_defaults_from_serde() {
        let template: SgqrIdTemplate = serde_json::from_str(
            r#"{"sgqr_number": "200101012345", "revision_date": "20260825"}"#,
        )
        .unwrap();
        assert_eq!(template.version, "01.0001");
        assert_eq!(template.postal_code, "000000");
        assert_eq!(template.level, "01");
        assert_eq!(template.unit, "001");
        assert_eq!(template.misc, "0000");
    }

    #[test]
    fn sgqr_id_block_encodes_fixed_subfield_order() {
        let element = sample_sgqr_id().to_element(tag(51));
        assert_eq!(
            encode_element(&element).unwrap(),
            "51810007SG.SGQR0112200101012345020701.00010306238801040201050300106040000070820260825"
        );
    }

    // -- PaymentSystemTemplate tests ------------------------------------------

    #[test]
    fn payment_label_falls_back_to_global_identifier() {
        let mut template = paynow_template();
        assert_eq!(template.label(), "PayNow");
        template.display_name.clear();
        assert_eq!(template.label(), "SG.PAYNOW");
    }

    #[test]
    fn payment_block_leads_with_global_identifier() {
        let element = paynow_template().to_element(tag(26));
        assert_eq!(
            encode_element(&element).unwrap(),
            "26380009SG.PAYNOW010120211+659123456703011"
        );
    }

    #[test]
    fn payment_template_rejects_reserved_inner_tag() {
        let mut template = paynow_template();
        template.fields.push(field(0, "SHADOW"));
        assert_eq!(
            template.validate(),
            Err(PayloadError::ReservedInnerTag {
                template: "PayNow".into(),
                tag: tag(0),
            })
        );
    }

    #[test]
    fn payment_template_rejects_duplicate_inner_tag() {
        let mut template = paynow_template();
        template.fields.push(field(2, "+6500000000"));
        assert_eq!(
            template.validate(),
            Err(PayloadError::DuplicateInnerTag {
                template: "PayNow".into(),
                tag: tag(2),
            })
        );
    }

    #[test]
    fn inner_tag_check_accepts_distinct_nonzero_tags() {
        let fields = vec![field(1, "INV-1"), field(3, "OUTLET-05")];
        assert_eq!(check_inner_tags("additional data", &fields), Ok(()));
    }
}
