pub mod alloc;
pub mod assemble;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod parse;
pub mod schema;
pub mod template;
pub mod types;

#[cfg(test)]
mod test_util;

pub use assemble::{assemble, generate};
pub use error::PayloadError;
pub use parse::parse_payload;
pub use types::{
    AssembleOptions, DataElement, InitiationMethod, OverflowPolicy, ParseOptions, QrPayload,
    SgqrConfig, Tag,
};
