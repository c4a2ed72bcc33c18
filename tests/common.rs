#![allow(dead_code)]

use std::collections::HashMap;

use abx2xml::{
    ATTRIBUTE, END_DOCUMENT, END_TAG, PROTOCOL_MAGIC_VERSION_0, START_DOCUMENT, START_TAG, TEXT,
    TYPE_BOOLEAN_FALSE, TYPE_BOOLEAN_TRUE, TYPE_BYTES_BASE64, TYPE_BYTES_HEX, TYPE_DOUBLE,
    TYPE_FLOAT, TYPE_INT, TYPE_INT_HEX, TYPE_LONG, TYPE_LONG_HEX, TYPE_NULL, TYPE_STRING,
    TYPE_STRING_INTERNED,
};

/// Builds ABX byte streams the way a serializer would, interning each string
/// the first time it appears and referencing it by index afterwards.
pub struct AbxBuilder {
    buf: Vec<u8>,
    interned: HashMap<String, u16>,
}

impl AbxBuilder {
    pub fn new() -> Self {
        Self {
            buf: PROTOCOL_MAGIC_VERSION_0.to_vec(),
            interned: HashMap::new(),
        }
    }

    /// Starts from an empty buffer, without the magic header.
    pub fn without_magic() -> Self {
        Self {
            buf: Vec::new(),
            interned: HashMap::new(),
        }
    }

    /// Appends arbitrary bytes verbatim, for malformed-stream tests.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn start_document(mut self) -> Self {
        self.token(START_DOCUMENT, TYPE_NULL);
        self
    }

    pub fn end_document(mut self) -> Self {
        self.token(END_DOCUMENT, TYPE_NULL);
        self
    }

    pub fn start_tag(mut self, name: &str) -> Self {
        self.token(START_TAG, TYPE_STRING_INTERNED);
        self.push_interned(name);
        self
    }

    pub fn end_tag(mut self, name: &str) -> Self {
        self.token(END_TAG, TYPE_STRING_INTERNED);
        self.push_interned(name);
        self
    }

    pub fn text(mut self, value: &str) -> Self {
        self.token(TEXT, TYPE_STRING);
        self.push_string_raw(value);
        self
    }

    pub fn attr_null(mut self, name: &str) -> Self {
        self.attribute(TYPE_NULL, name);
        self
    }

    pub fn attr_bool(mut self, name: &str, value: bool) -> Self {
        let type_tag = if value {
            TYPE_BOOLEAN_TRUE
        } else {
            TYPE_BOOLEAN_FALSE
        };
        self.attribute(type_tag, name);
        self
    }

    pub fn attr_int(mut self, name: &str, value: i32) -> Self {
        self.attribute(TYPE_INT, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_int_hex(mut self, name: &str, value: i32) -> Self {
        self.attribute(TYPE_INT_HEX, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_long(mut self, name: &str, value: i64) -> Self {
        self.attribute(TYPE_LONG, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_long_hex(mut self, name: &str, value: i64) -> Self {
        self.attribute(TYPE_LONG_HEX, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_float(mut self, name: &str, value: f32) -> Self {
        self.attribute(TYPE_FLOAT, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_double(mut self, name: &str, value: f64) -> Self {
        self.attribute(TYPE_DOUBLE, name);
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn attr_string(mut self, name: &str, value: &str) -> Self {
        self.attribute(TYPE_STRING, name);
        self.push_string_raw(value);
        self
    }

    pub fn attr_interned_string(mut self, name: &str, value: &str) -> Self {
        self.attribute(TYPE_STRING_INTERNED, name);
        self.push_interned(value);
        self
    }

    pub fn attr_bytes_hex(mut self, name: &str, value: &[u8]) -> Self {
        self.attribute(TYPE_BYTES_HEX, name);
        self.push_blob(value);
        self
    }

    pub fn attr_bytes_base64(mut self, name: &str, value: &[u8]) -> Self {
        self.attribute(TYPE_BYTES_BASE64, name);
        self.push_blob(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    fn token(&mut self, event: u8, type_tag: u8) {
        self.buf.push(event | type_tag);
    }

    fn attribute(&mut self, type_tag: u8, name: &str) {
        self.token(ATTRIBUTE, type_tag);
        self.push_interned(name);
    }

    fn push_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn push_string_raw(&mut self, value: &str) {
        self.push_u16(value.len() as u16);
        self.buf.extend_from_slice(value.as_bytes());
    }

    fn push_blob(&mut self, value: &[u8]) {
        self.push_u16(value.len() as u16);
        self.buf.extend_from_slice(value);
    }

    fn push_interned(&mut self, value: &str) {
        match self.interned.get(value) {
            Some(&index) => self.push_u16(index),
            None => {
                let index = self.interned.len() as u16;
                self.interned.insert(value.to_owned(), index);
                self.push_u16(0xFFFF);
                self.push_string_raw(value);
            }
        }
    }
}
