//! Property list document model and generation.
//!
//! An ordered, typed in-memory document plus the assembler that fills it
//! from a job configuration and the writer that serializes it to XML.

mod document;
mod generate;
mod value;
mod writer;

pub use document::Document;
pub use generate::{GenerateError, PlistGenerator};
pub use value::Value;
