//! Payload assembly: mandatory-field checks, tag allocation, fixed
//! emission order, the length ceiling, and the closing checksum.

use std::collections::BTreeMap;

use crate::alloc;
use crate::checksum;
use crate::codec;
use crate::error::PayloadError;
use crate::parse;
use crate::schema;
use crate::template;
use crate::types::{
    AssembleOptions, DataElement, OverflowPolicy, ParseOptions, QrPayload, SgqrConfig, Tag,
};

/// Assemble a payload and re-parse it through the validator before
/// returning, so a `QrPayload` handed out is always round-trip clean.
pub fn generate(config: &SgqrConfig, options: &AssembleOptions) -> Result<QrPayload, PayloadError> {
    let payload = assemble(config, options)?;
    let parse_options = ParseOptions {
        sgqr_id_tag: options.sgqr_id_tag,
    };
    parse::parse_payload(payload.as_str(), &parse_options)?;
    Ok(payload)
}

/// Assemble a payload without the closing self-verification.
///
/// Emission order is fixed: format indicator, initiation method, merchant
/// category code, currency, optional amount, country, merchant name,
/// merchant city, optional postal code, the SGQR-ID block, payment-system
/// blocks in allocation order, the optional additional-data block, and the
/// checksum trailer.
pub fn assemble(config: &SgqrConfig, options: &AssembleOptions) -> Result<QrPayload, PayloadError> {
    check_mandatory(config)?;
    for system in &config.payment_systems {
        system.validate()?;
    }
    template::check_inner_tags("additional data", &config.additional_data)?;

    let mut reserved = BTreeMap::new();
    if schema::is_payment_system_tag(options.sgqr_id_tag) {
        reserved.insert(options.sgqr_id_tag, "SGQR ID block".to_string());
    }
    let assigned = alloc::allocate_tags(&config.payment_systems, &reserved)?;

    let mut assembly = Assembly::build(config, options, &assigned);
    loop {
        let body = codec::encode_elements(&assembly.ordered())?;
        let crc = checksum::payload_checksum(&body);
        let trailer = codec::encode_element(&DataElement::leaf(schema::CRC, crc))?;
        let text = body + &trailer;

        if text.len() <= options.max_payload_len {
            tracing::debug!(len = text.len(), "payload assembled");
            return Ok(QrPayload::new(text));
        }

        let dropped = match options.overflow_policy {
            OverflowPolicy::Reject => None,
            OverflowPolicy::DropOptional => assembly.drop_next_optional(),
            OverflowPolicy::DropPaymentSystems => assembly.drop_last_payment_system(),
        };
        match dropped {
            Some(what) => tracing::warn!(
                dropped = %what,
                len = text.len(),
                max = options.max_payload_len,
                "payload over length limit, shedding optional content"
            ),
            None => {
                return Err(PayloadError::PayloadTooLong {
                    len: text.len(),
                    max: options.max_payload_len,
                });
            }
        }
    }
}

fn check_mandatory(config: &SgqrConfig) -> Result<(), PayloadError> {
    require_nonempty("merchant_name", &config.merchant_name)?;
    require_nonempty("merchant_city", &config.merchant_city)?;
    require_nonempty("merchant_category_code", &config.merchant_category_code)?;
    require_nonempty("currency", &config.currency)?;
    require_nonempty("country_code", &config.country_code)?;
    require_nonempty("sgqr_id.sgqr_number", &config.sgqr_id.sgqr_number)?;
    require_nonempty("sgqr_id.revision_date", &config.sgqr_id.revision_date)?;
    Ok(())
}

fn require_nonempty(field: &'static str, value: &str) -> Result<(), PayloadError> {
    if value.trim().is_empty() {
        return Err(PayloadError::MissingMandatoryField { field });
    }
    Ok(())
}

/// The payload's parts, held separately so overflow policies can shed the
/// optional ones without re-deriving the rest.
struct Assembly {
    head: Vec<DataElement>,
    amount: Option<DataElement>,
    address: Vec<DataElement>,
    postal: Option<DataElement>,
    sgqr_id: DataElement,
    payment_systems: Vec<DataElement>,
    additional: Option<DataElement>,
}

impl Assembly {
    fn build(config: &SgqrConfig, options: &AssembleOptions, assigned: &[Tag]) -> Self {
        let head = vec![
            DataElement::leaf(schema::FORMAT_INDICATOR, schema::FORMAT_INDICATOR_VALUE),
            DataElement::leaf(schema::INITIATION_METHOD, config.initiation_method.code()),
            DataElement::leaf(
                schema::MERCHANT_CATEGORY_CODE,
                config.merchant_category_code.as_str(),
            ),
            DataElement::leaf(schema::TRANSACTION_CURRENCY, config.currency.as_str()),
        ];
        let amount = config
            .amount
            .as_deref()
            .map(|amount| DataElement::leaf(schema::TRANSACTION_AMOUNT, amount));
        let address = vec![
            DataElement::leaf(schema::COUNTRY_CODE, config.country_code.as_str()),
            DataElement::leaf(schema::MERCHANT_NAME, config.merchant_name.as_str()),
            DataElement::leaf(schema::MERCHANT_CITY, config.merchant_city.as_str()),
        ];
        let postal = config
            .merchant_postal_code
            .as_deref()
            .map(|postal| DataElement::leaf(schema::POSTAL_CODE, postal));
        let sgqr_id = config.sgqr_id.to_element(options.sgqr_id_tag);
        let payment_systems = config
            .payment_systems
            .iter()
            .zip(assigned)
            .map(|(system, &tag)| system.to_element(tag))
            .collect();
        let additional = if config.additional_data.is_empty() {
            None
        } else {
            Some(DataElement::group(
                schema::ADDITIONAL_DATA,
                config
                    .additional_data
                    .iter()
                    .map(|f| DataElement::leaf(f.tag, f.value.as_str()))
                    .collect(),
            ))
        };

        Self {
            head,
            amount,
            address,
            postal,
            sgqr_id,
            payment_systems,
            additional,
        }
    }

    fn ordered(&self) -> Vec<DataElement> {
        let mut out = self.head.clone();
        out.extend(self.amount.clone());
        out.extend(self.address.iter().cloned());
        out.extend(self.postal.clone());
        out.push(self.sgqr_id.clone());
        out.extend(self.payment_systems.iter().cloned());
        out.extend(self.additional.clone());
        out
    }

    /// Shed order for `DropOptional`: additional data, postal code, amount.
    fn drop_next_optional(&mut self) -> Option<String> {
        if self.additional.take().is_some() {
            return Some("additional-data block".into());
        }
        if self.postal.take().is_some() {
            return Some("postal code".into());
        }
        if self.amount.take().is_some() {
            return Some("transaction amount".into());
        }
        None
    }

    fn drop_last_payment_system(&mut self) -> Option<String> {
        self.payment_systems
            .pop()
            .map(|block| format!("payment-system block {}", block.tag()))
    }
}
