//! CRC-16/CCITT-FALSE checksum for payload trailers.
//!
//! Polynomial 0x1021, initial value 0xFFFF, no bit reflection, no final
//! XOR; the `crc` crate ships this parameter set as `CRC_16_IBM_3740`.
//! Checksums render as exactly four uppercase hex digits.

use crc::{Crc, CRC_16_IBM_3740};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Tag and length digits of the checksum element itself. The checksum
/// covers everything before it plus these four bytes.
const TRAILER_HEADER: &[u8] = b"6304";

/// CRC over raw bytes, rendered as four uppercase hex digits.
#[must_use]
pub fn crc16_hex(data: &[u8]) -> String {
    format!("{:04X}", CRC16.checksum(data))
}

/// Checksum value for an assembled body, i.e. the payload text up to but
/// not including the checksum element. The trailer's own `6304` header is
/// folded in before finalizing.
#[must_use]
pub fn payload_checksum(body: &str) -> String {
    let mut digest = CRC16.digest();
    digest.update(body.as_bytes());
    digest.update(TRAILER_HEADER);
    format!("{:04X}", digest.finalize())
}
