//! A library for converting Android Binary XML (ABX) to human-readable XML.
//!
//! ABX encodes an XML document as a stream of single-byte-framed events with
//! typed attribute values and interned strings. This crate decodes that
//! stream into an element tree and renders the tree back as textual XML.
//!
//! # Examples
//!
//! ```no_run
//! use abx2xml::AbxToXmlConverter;
//!
//! // Convert a file
//! AbxToXmlConverter::convert_file("input.abx", "output.xml", false).unwrap();
//!
//! // Convert bytes already in memory
//! let data = std::fs::read("input.abx").unwrap();
//! let xml = AbxToXmlConverter::convert_bytes(&data, false).unwrap();
//! println!("{xml}");
//! ```

use std::io;
use std::str::Utf8Error;
use thiserror::Error;

mod binary_xml;
pub mod cli;
mod converter;
mod document;

pub use binary_xml::{BinaryXmlDecoder, ByteCursor, StringTable};
pub use converter::AbxToXmlConverter;
pub use document::{Document, Element};

/// Error types for ABX decoding and conversion
#[derive(Error, Debug)]
pub enum AbxError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid ABX magic header. Expected: {expected:02X?}, got: {actual:02X?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },
    #[error("Unexpected end of input while reading {0}")]
    TruncatedInput(&'static str),
    #[error("Interned string reference {0} is out of range")]
    CorruptInterning(i16),
    #[error("Event {event:#04x} paired with invalid type tag {type_tag:#04x}")]
    InvalidFraming { event: u8, type_tag: u8 },
    #[error("Unclosed elements at END_DOCUMENT")]
    UnclosedElements,
    #[error("END_TAG with no open element")]
    UnexpectedEndTag,
    #[error("END_TAG `{found}` does not close `{expected}`")]
    MismatchedEndTag { expected: String, found: String },
    #[error("Text content outside of any element")]
    TextOutsideElement,
    #[error("Attribute outside of any element")]
    UnexpectedAttribute,
    #[error("Unsupported event token {0:#04x}")]
    UnsupportedEvent(u8),
    #[error("Unsupported attribute value type {0:#04x}")]
    UnsupportedValueType(u8),
    #[error("No root element found")]
    NoRootElement,
    #[error("String data is not valid UTF-8")]
    MalformedUtf8(#[from] Utf8Error),
    #[error("{0}")]
    Usage(String),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, AbxError>;

// Protocol constants - exposed for advanced users
pub const PROTOCOL_MAGIC_VERSION_0: [u8; 4] = [0x41, 0x42, 0x58, 0x00];

// Event tokens (low nibble of the framing byte)
pub const START_DOCUMENT: u8 = 0;
pub const END_DOCUMENT: u8 = 1;
pub const START_TAG: u8 = 2;
pub const END_TAG: u8 = 3;
pub const TEXT: u8 = 4;
pub const ATTRIBUTE: u8 = 15;

// Type tokens (high nibble of the framing byte)
pub const TYPE_NULL: u8 = 1 << 4;
pub const TYPE_STRING: u8 = 2 << 4;
pub const TYPE_STRING_INTERNED: u8 = 3 << 4;
pub const TYPE_BYTES_HEX: u8 = 4 << 4;
pub const TYPE_BYTES_BASE64: u8 = 5 << 4;
pub const TYPE_INT: u8 = 6 << 4;
pub const TYPE_INT_HEX: u8 = 7 << 4;
pub const TYPE_LONG: u8 = 8 << 4;
pub const TYPE_LONG_HEX: u8 = 9 << 4;
pub const TYPE_FLOAT: u8 = 10 << 4;
pub const TYPE_DOUBLE: u8 = 11 << 4;
pub const TYPE_BOOLEAN_TRUE: u8 = 12 << 4;
pub const TYPE_BOOLEAN_FALSE: u8 = 13 << 4;

/// Tag given to the synthetic wrapper element in multi-root mode.
pub const SYNTHETIC_ROOT_TAG: &str = "root";
