//! Round-trip validation: strict decoding, checksum verification, and
//! expansion of the nested blocks.
//!
//! Parsing is as strict as assembly. Anything the assembler would refuse
//! to emit, the parser refuses to accept, so a payload that parses here
//! re-encodes to exactly the input text.

use crate::checksum;
use crate::codec;
use crate::error::PayloadError;
use crate::schema;
use crate::types::{DataElement, ParseOptions, Tag};

/// Decode a payload, verify its checksum, and expand the nested blocks.
///
/// The checksum is verified against the flat decoding before any block is
/// expanded, so tampering anywhere in the text surfaces as
/// `ChecksumMismatch` rather than as a confusing inner decode error.
/// Returns the ordered element tree, trailing checksum element included.
pub fn parse_payload(
    input: &str,
    options: &ParseOptions,
) -> Result<Vec<DataElement>, PayloadError> {
    let flat = codec::decode_elements(input)?;
    verify_trailer(input, &flat)?;

    let tree = flat
        .into_iter()
        .map(|element| expand_block(element, options))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(elements = tree.len(), "payload parsed and checksum verified");
    Ok(tree)
}

/// The checksum element must close the payload: tag 63 with exactly four
/// characters, matching the CRC over everything before it plus its own
/// tag and length digits.
fn verify_trailer(input: &str, flat: &[DataElement]) -> Result<(), PayloadError> {
    let Some(DataElement::Leaf { tag, value }) = flat.last() else {
        return Err(PayloadError::MissingMandatoryField { field: "crc" });
    };
    if *tag != schema::CRC || value.len() != 4 {
        return Err(PayloadError::MissingMandatoryField { field: "crc" });
    }

    let computed = checksum::crc16_hex(&input.as_bytes()[..input.len() - 4]);
    if *value != computed {
        return Err(PayloadError::ChecksumMismatch {
            declared: value.clone(),
            computed,
        });
    }
    Ok(())
}

/// Expand a top-level leaf into a `Group` when its tag carries a nested
/// block: the SGQR-ID slot, the payment-system range, or additional data.
/// Everything else stays opaque, legacy scheme slots included.
fn expand_block(element: DataElement, options: &ParseOptions) -> Result<DataElement, PayloadError> {
    match element {
        DataElement::Leaf { tag, value } if is_block_tag(tag, options) => {
            let inner = codec::decode_elements(&value)?;
            Ok(DataElement::group(tag, inner))
        }
        other => Ok(other),
    }
}

fn is_block_tag(tag: Tag, options: &ParseOptions) -> bool {
    tag == options.sgqr_id_tag
        || tag == schema::ADDITIONAL_DATA
        || schema::is_payment_system_tag(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::tag;

    const FAVE: &str = "0002010102115204581453037025802SG5909Fave Cafe6009Singapore51810007SG.SGQR0112200101012345020701.0001030623880104020105030010604000007082026082526130009SG.PAYNOW6304F2EC";

    /// Encode body elements and seal them with a computed trailer.
    fn sealed(body: &[DataElement]) -> String {
        let encoded = codec::encode_elements(body).unwrap();
        let crc = checksum::payload_checksum(&encoded);
        format!("{encoded}6304{crc}")
    }

    // -- structure tests ------------------------------------------------------

    #[test]
    fn parses_full_payload_structure() {
        let tree = parse_payload(FAVE, &ParseOptions::default()).unwrap();
        assert_eq!(tree.len(), 10);

        let tags: Vec<u8> = tree.iter().map(|e| e.tag().as_u8()).collect();
        assert_eq!(tags, vec![0, 1, 52, 53, 58, 59, 60, 51, 26, 63]);

        let DataElement::Group { elements, .. } = &tree[7] else {
            panic!("SGQR-ID block should expand");
        };
        assert_eq!(elements.len(), 8);
        assert_eq!(elements[0], DataElement::leaf(tag(0), "SG.SGQR"));
        assert_eq!(elements[1], DataElement::leaf(tag(1), "200101012345"));

        let DataElement::Group { elements, .. } = &tree[8] else {
            panic!("payment-system block should expand");
        };
        assert_eq!(elements[0], DataElement::leaf(tag(0), "SG.PAYNOW"));

        assert_eq!(*tree.last().unwrap(), DataElement::leaf(tag(63), "F2EC"));
    }

    #[test]
    fn reencoding_the_tree_reproduces_the_input() {
        let tree = parse_payload(FAVE, &ParseOptions::default()).unwrap();
        assert_eq!(codec::encode_elements(&tree).unwrap(), FAVE);
    }

    #[test]
    fn additional_data_block_expands() {
        let input = sealed(&[
            DataElement::leaf(tag(0), "01"),
            DataElement::group(tag(62), vec![DataElement::leaf(tag(3), "OUTLET-05")]),
        ]);
        let tree = parse_payload(&input, &ParseOptions::default()).unwrap();
        assert_eq!(
            tree[1],
            DataElement::group(tag(62), vec![DataElement::leaf(tag(3), "OUTLET-05")])
        );
    }

    #[test]
    fn sgqr_block_follows_the_configured_tag() {
        let input = sealed(&[
            DataElement::leaf(tag(0), "01"),
            DataElement::group(tag(27), vec![DataElement::leaf(tag(0), "SG.SGQR")]),
        ]);
        let options = ParseOptions {
            sgqr_id_tag: tag(27),
        };
        let tree = parse_payload(&input, &options).unwrap();
        let DataElement::Group { elements, .. } = &tree[1] else {
            panic!("tag 27 should expand as the SGQR-ID block");
        };
        assert_eq!(elements[0], DataElement::leaf(tag(0), "SG.SGQR"));
    }

    #[test]
    fn legacy_scheme_slots_stay_opaque() {
        // Tag 02 (Visa) is outside 26-50 and holds no TLV structure.
        let input = sealed(&[
            DataElement::leaf(tag(0), "01"),
            DataElement::leaf(tag(2), "4123456789012345"),
        ]);
        let tree = parse_payload(&input, &ParseOptions::default()).unwrap();
        assert_eq!(tree[1], DataElement::leaf(tag(2), "4123456789012345"));
    }

    // -- trailer tests --------------------------------------------------------

    #[test]
    fn rejects_tampered_value_with_checksum_mismatch() {
        let tampered = FAVE.replace("Fave Cafe", "Gave Cafe");
        match parse_payload(&tampered, &ParseOptions::default()) {
            Err(PayloadError::ChecksumMismatch { declared, .. }) => {
                assert_eq!(declared, "F2EC");
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_tampered_tag_with_checksum_mismatch() {
        // 59 -> 58 keeps the structure decodable; only the checksum trips.
        let tampered = FAVE.replace("5909Fave", "5809Fave");
        assert!(matches!(
            parse_payload(&tampered, &ParseOptions::default()),
            Err(PayloadError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn checksum_comparison_is_case_sensitive() {
        let lowered = format!("{}{}", &FAVE[..FAVE.len() - 4], "f2ec");
        assert_eq!(
            parse_payload(&lowered, &ParseOptions::default()),
            Err(PayloadError::ChecksumMismatch {
                declared: "f2ec".into(),
                computed: "F2EC".into(),
            })
        );
    }

    #[test]
    fn rejects_payload_without_trailer() {
        let stripped = &FAVE[..FAVE.len() - 8];
        assert_eq!(
            parse_payload(stripped, &ParseOptions::default()),
            Err(PayloadError::MissingMandatoryField { field: "crc" })
        );
    }

    #[test]
    fn rejects_checksum_of_wrong_declared_length() {
        assert_eq!(
            parse_payload("0002016303ABC", &ParseOptions::default()),
            Err(PayloadError::MissingMandatoryField { field: "crc" })
        );
    }

    #[test]
    fn rejects_elements_after_the_checksum() {
        let extended = format!("{FAVE}0000");
        assert_eq!(
            parse_payload(&extended, &ParseOptions::default()),
            Err(PayloadError::MissingMandatoryField { field: "crc" })
        );
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(
            parse_payload("", &ParseOptions::default()),
            Err(PayloadError::MissingMandatoryField { field: "crc" })
        );
    }

    #[test]
    fn truncation_is_reported_before_checksum() {
        let clipped = &FAVE[..40];
        assert!(matches!(
            parse_payload(clipped, &ParseOptions::default()),
            Err(PayloadError::TruncatedInput { .. })
        ));
    }
}
