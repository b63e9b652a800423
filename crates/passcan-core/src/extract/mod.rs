//! Field extraction from recognized document text.

mod parser;
pub mod rules;

pub use parser::{DocumentParser, ExtractionResult, PassportParser};
