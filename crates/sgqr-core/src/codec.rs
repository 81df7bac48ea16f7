//! Text TLV codec for EMV-style payloads.
//!
//! Every data element is spelled `TTLLV…V`: a two-digit tag, a two-digit
//! zero-padded length, then exactly that many value bytes. The declared
//! length is authoritative when decoding; value bytes are never inspected
//! for structure. Values are limited to printable ASCII (`0x20..=0x7E`) and
//! 99 bytes, checked on both encode and decode.

use crate::error::PayloadError;
use crate::types::{DataElement, Tag};

/// Tag and length digits preceding every value.
const HEADER_LEN: usize = 4;

/// Largest value a two-digit length field can declare.
const VALUE_LEN_MAX: usize = 99;

// ==============================================================================
// Encoding
// ==============================================================================

/// Encode one element, recursively for `Group` values.
pub fn encode_element(element: &DataElement) -> Result<String, PayloadError> {
    let mut out = String::new();
    encode_into(element, &mut out)?;
    Ok(out)
}

/// Encode a sequence of elements back to back.
pub fn encode_elements(elements: &[DataElement]) -> Result<String, PayloadError> {
    let mut out = String::new();
    for element in elements {
        encode_into(element, &mut out)?;
    }
    Ok(out)
}

fn encode_into(element: &DataElement, out: &mut String) -> Result<(), PayloadError> {
    match element {
        DataElement::Leaf { tag, value } => {
            check_value_charset(*tag, value.as_bytes())?;
            push_header_and_value(*tag, value, out)
        }
        DataElement::Group { tag, elements } => {
            // Inner charset is checked leaf by leaf; the wrapper only has to
            // fit the combined encoding under its own length field.
            let inner = encode_elements(elements)?;
            push_header_and_value(*tag, &inner, out)
        }
    }
}

fn push_header_and_value(tag: Tag, value: &str, out: &mut String) -> Result<(), PayloadError> {
    if value.len() > VALUE_LEN_MAX {
        return Err(PayloadError::LengthOverflow {
            tag,
            len: value.len(),
        });
    }
    out.push_str(&format!("{tag}{:02}{value}", value.len()));
    Ok(())
}

fn check_value_charset(tag: Tag, value: &[u8]) -> Result<(), PayloadError> {
    for (position, &found) in value.iter().enumerate() {
        if !(0x20..=0x7E).contains(&found) {
            return Err(PayloadError::CharsetViolation {
                tag,
                found,
                position,
            });
        }
    }
    Ok(())
}

// ==============================================================================
// Decoding
// ==============================================================================

/// Decode the element starting at `offset`, returning it together with the
/// offset of the next element. Always yields a `Leaf`; expanding nested
/// blocks into `Group`s is the parser's schema-aware job.
pub fn decode_element(input: &str, offset: usize) -> Result<(DataElement, usize), PayloadError> {
    let bytes = input.as_bytes();
    let remaining = bytes.len().saturating_sub(offset);
    if remaining < HEADER_LEN {
        return Err(PayloadError::TruncatedInput {
            offset,
            needed: HEADER_LEN,
            remaining,
        });
    }

    let tag_bytes = &bytes[offset..offset + 2];
    if !tag_bytes[0].is_ascii_digit() || !tag_bytes[1].is_ascii_digit() {
        return Err(PayloadError::InvalidTagField {
            offset,
            found: String::from_utf8_lossy(tag_bytes).into_owned(),
        });
    }
    let len_bytes = &bytes[offset + 2..offset + 4];
    if !len_bytes[0].is_ascii_digit() || !len_bytes[1].is_ascii_digit() {
        return Err(PayloadError::InvalidLengthField {
            offset: offset + 2,
            found: String::from_utf8_lossy(len_bytes).into_owned(),
        });
    }

    let tag = Tag::new((tag_bytes[0] - b'0') * 10 + (tag_bytes[1] - b'0'))?;
    let value_len = usize::from((len_bytes[0] - b'0') * 10 + (len_bytes[1] - b'0'));

    let needed = HEADER_LEN + value_len;
    if remaining < needed {
        return Err(PayloadError::TruncatedInput {
            offset,
            needed,
            remaining,
        });
    }

    let value_bytes = &bytes[offset + HEADER_LEN..offset + needed];
    check_value_charset(tag, value_bytes)?;
    // All bytes are printable ASCII at this point, so this cannot reorder
    // or widen anything.
    let value: String = value_bytes.iter().map(|&b| char::from(b)).collect();

    Ok((DataElement::leaf(tag, value), offset + needed))
}

/// Decode a whole string as a back-to-back element sequence.
/// Trailing garbage that does not form a complete element is an error.
pub fn decode_elements(input: &str) -> Result<Vec<DataElement>, PayloadError> {
    let mut elements = Vec::new();
    let mut offset = 0;
    while offset < input.len() {
        let (element, next) = decode_element(input, offset)?;
        elements.push(element);
        offset = next;
    }
    Ok(elements)
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Encoded size of an element in bytes, header included. Display helper;
/// does not enforce the 99-byte value limit.
#[must_use]
pub fn encoded_len(element: &DataElement) -> usize {
    match element {
        DataElement::Leaf { value, .. } => HEADER_LEN + value.len(),
        DataElement::Group { elements, .. } => {
            HEADER_LEN + elements.iter().map(encoded_len).sum::<usize>()
        }
    }
}
