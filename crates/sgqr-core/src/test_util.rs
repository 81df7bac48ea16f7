//! Shared test helpers for `sgqr-core` unit tests.
//!
//! Consolidates builder functions for tags, fields, and templates
//! (`tag`, `field`, `paynow_template`, `sample_config`, etc.) so that
//! tests across modules share a single source of truth for fixture data.

use crate::template::{DataField, PaymentSystemTemplate, SgqrIdTemplate};
use crate::types::{InitiationMethod, SgqrConfig, Tag};

// ==============================================================================
// Tag and Field Builders
// ==============================================================================

/// A `Tag` from a bare number; panics on values over 99.
pub fn tag(value: u8) -> Tag {
    Tag::new(value).unwrap()
}

/// A `DataField` on the given inner tag.
pub fn field(tag_value: u8, value: &str) -> DataField {
    DataField {
        tag: tag(tag_value),
        value: value.into(),
    }
}

// ==============================================================================
// Template Builders
// ==============================================================================

/// The SGQR-ID registration used across fixture payloads.
pub fn sample_sgqr_id() -> SgqrIdTemplate {
    SgqrIdTemplate {
        sgqr_number: "200101012345".into(),
        version: "01.0001".into(),
        postal_code: "238801".into(),
        level: "01".into(),
        unit: "001".into(),
        misc: "0000".into(),
        revision_date: "20260825".into(),
    }
}

/// A payment-system template with no fields and no tag preference.
/// Override `preferred_tag` or `fields` after construction when needed.
pub fn bare_template(name: &str, global_identifier: &str) -> PaymentSystemTemplate {
    PaymentSystemTemplate {
        display_name: name.into(),
        global_identifier: global_identifier.into(),
        preferred_tag: None,
        fields: Vec::new(),
    }
}

/// A PayNow template with proxy-type, proxy-value, and editable-amount
/// fields filled in.
pub fn paynow_template() -> PaymentSystemTemplate {
    PaymentSystemTemplate {
        display_name: "PayNow".into(),
        global_identifier: "SG.PAYNOW".into(),
        preferred_tag: None,
        fields: vec![field(1, "2"), field(2, "+6591234567"), field(3, "1")],
    }
}

// ==============================================================================
// Configuration Builders
// ==============================================================================

/// A minimal static-code merchant configuration with one bare PayNow
/// system: the smallest config that assembles to a complete payload.
pub fn sample_config() -> SgqrConfig {
    SgqrConfig {
        merchant_name: "Fave Cafe".into(),
        merchant_city: "Singapore".into(),
        merchant_category_code: "5814".into(),
        currency: "702".into(),
        country_code: "SG".into(),
        amount: None,
        merchant_postal_code: None,
        initiation_method: InitiationMethod::Static,
        sgqr_id: sample_sgqr_id(),
        payment_systems: vec![bare_template("PayNow", "SG.PAYNOW")],
        additional_data: Vec::new(),
    }
}
