use crate::{AbxError, PROTOCOL_MAGIC_VERSION_0, Result, SYNTHETIC_ROOT_TAG};
use crate::{ATTRIBUTE, END_DOCUMENT, END_TAG, START_DOCUMENT, START_TAG, TEXT};
use crate::{Document, Element};
use crate::{TYPE_BOOLEAN_FALSE, TYPE_BOOLEAN_TRUE};
use crate::{TYPE_BYTES_BASE64, TYPE_BYTES_HEX, TYPE_NULL, TYPE_STRING, TYPE_STRING_INTERNED};
use crate::{TYPE_DOUBLE, TYPE_FLOAT, TYPE_INT, TYPE_INT_HEX, TYPE_LONG, TYPE_LONG_HEX};
use base64::Engine;
use std::str;

/// Big-endian reader over a fixed byte source.
///
/// The whole input is buffered before decoding starts, so the cursor is a
/// plain position over a slice. All multi-byte reads are big-endian per the
/// ABX wire format, independent of the host byte order.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(AbxError::TruncatedInput(what))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let bytes = self.take(N, what)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n, "bytes")
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.take(1, "byte")?;
        Ok(bytes[0])
    }

    /// Read a 16-bit unsigned integer.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array("unsigned short")?))
    }

    /// Read a 16-bit signed integer.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array("short")?))
    }

    /// Read a 32-bit signed integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array("int")?))
    }

    /// Read a 64-bit signed integer.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array("long")?))
    }

    /// Read a 32-bit float.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array("float")?))
    }

    /// Read a 64-bit double.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array("double")?))
    }

    /// Advance the position by `n` bytes without materializing them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n, "skipped data").map(|_| ())
    }

    /// Step the position back by `n` bytes.
    pub fn rewind(&mut self, n: usize) {
        debug_assert!(n <= self.pos);
        self.pos = self.pos.saturating_sub(n);
    }

    /// Check whether the source is exhausted.
    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// Read a length-prefixed UTF-8 string (unsigned 16-bit length, then body).
fn read_string_raw(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let length = cursor.read_u16()? as usize;
    let bytes = cursor.read_bytes(length)?;
    Ok(str::from_utf8(bytes)?.to_owned())
}

/// Session-scoped table of interned strings.
///
/// ABX transmits each repeated string once and thereafter refers to it by a
/// backward index. The table is append-only and must not be shared across
/// documents.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` and return its index.
    pub fn define_next(&mut self, value: String) -> usize {
        self.strings.push(value);
        self.strings.len() - 1
    }

    /// Look up a backward reference read off the wire.
    ///
    /// Any reference that is negative or not yet defined is malformed input,
    /// reported as [`AbxError::CorruptInterning`].
    pub fn resolve(&self, reference: i16) -> Result<&str> {
        usize::try_from(reference)
            .ok()
            .and_then(|index| self.strings.get(index))
            .map(String::as_str)
            .ok_or(AbxError::CorruptInterning(reference))
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table holds no strings yet.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Read an interned string: a signed 16-bit reference, where -1 defines
    /// a new entry from a length-prefixed string and anything else resolves
    /// a previous one.
    pub fn read_interned(&mut self, cursor: &mut ByteCursor<'_>) -> Result<String> {
        let reference = cursor.read_i16()?;
        if reference == -1 {
            let value = read_string_raw(cursor)?;
            self.define_next(value.clone());
            Ok(value)
        } else {
            self.resolve(reference).map(str::to_owned)
        }
    }
}

fn expect_type(event: u8, type_tag: u8, expected: u8) -> Result<()> {
    if type_tag == expected {
        Ok(())
    } else {
        Err(AbxError::InvalidFraming { event, type_tag })
    }
}

/// Binary XML decoder that turns an ABX byte stream into a [`Document`].
///
/// One decoder handles one stream: it owns the cursor, the interning table,
/// and the stack of open elements, and is consumed by [`decode`].
///
/// [`decode`]: BinaryXmlDecoder::decode
pub struct BinaryXmlDecoder<'a> {
    cursor: ByteCursor<'a>,
    strings: StringTable,
    element_stack: Vec<Element>,
    root: Option<Element>,
    multi_root: bool,
}

impl<'a> BinaryXmlDecoder<'a> {
    /// Create a decoder over `data`. In multi-root mode every top-level
    /// element (and any stray top-level content) is collected under a
    /// synthetic wrapper element.
    pub fn new(data: &'a [u8], multi_root: bool) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            strings: StringTable::new(),
            element_stack: Vec::new(),
            root: None,
            multi_root,
        }
    }

    /// Run the decode pass and return the assembled document.
    pub fn decode(mut self) -> Result<Document> {
        self.expect_magic()?;
        self.skip_header_extension()?;

        if self.multi_root {
            self.element_stack.push(Element::new(SYNTHETIC_ROOT_TAG));
        }

        while !self.cursor.at_end() {
            if !self.process_token()? {
                break;
            }
        }

        // Streams may legally end without END_DOCUMENT; fold whatever is
        // still open into its parent so the partial tree survives.
        self.close_open_elements();

        match self.root.take() {
            Some(root) if self.multi_root => Ok(Document::with_synthetic_root(root)),
            Some(root) => Ok(Document::new(root)),
            None => Err(AbxError::NoRootElement),
        }
    }

    fn expect_magic(&mut self) -> Result<()> {
        let mut actual = [0u8; 4];
        actual.copy_from_slice(self.cursor.read_bytes(4)?);
        if actual != PROTOCOL_MAGIC_VERSION_0 {
            return Err(AbxError::InvalidMagic {
                expected: PROTOCOL_MAGIC_VERSION_0,
                actual,
            });
        }
        Ok(())
    }

    /// Discard vendor extension records between the magic and the first real
    /// event. The loop stops at the byte whose low nibble is START_DOCUMENT
    /// and rewinds it so the main loop sees it again.
    fn skip_header_extension(&mut self) -> Result<()> {
        loop {
            let token = self.cursor.read_u8()?;
            if token & 0x0F == START_DOCUMENT {
                self.cursor.rewind(1);
                return Ok(());
            }

            match token & 0xF0 {
                TYPE_NULL => {}
                TYPE_INT | TYPE_FLOAT => self.cursor.skip(4)?,
                TYPE_LONG | TYPE_DOUBLE => self.cursor.skip(8)?,
                TYPE_STRING | TYPE_STRING_INTERNED => {
                    let length = self.cursor.read_u16()? as usize;
                    self.cursor.skip(length)?;
                }
                TYPE_BYTES_HEX | TYPE_BYTES_BASE64 => {
                    let length = self.cursor.read_i16()? as u16 as usize;
                    self.cursor.skip(length)?;
                }
                // Unknown record: skip as many bytes as the low nibble says.
                _ => self.cursor.skip((token & 0x0F) as usize)?,
            }
        }
    }

    /// Whether an element other than the multi-root synthetic wrapper is
    /// currently open.
    fn has_open_element(&self) -> bool {
        match self.element_stack.len() {
            0 => false,
            1 => !self.multi_root,
            _ => true,
        }
    }

    /// Process a single event token. Returns `false` once END_DOCUMENT
    /// terminates the stream.
    fn process_token(&mut self) -> Result<bool> {
        let token = self.cursor.read_u8()?;
        let event = token & 0x0F;
        let type_tag = token & 0xF0;

        match event {
            START_DOCUMENT => {
                expect_type(event, type_tag, TYPE_NULL)?;
                Ok(true)
            }

            END_DOCUMENT => {
                expect_type(event, type_tag, TYPE_NULL)?;
                if self.has_open_element() {
                    return Err(AbxError::UnclosedElements);
                }
                Ok(false)
            }

            START_TAG => {
                expect_type(event, type_tag, TYPE_STRING_INTERNED)?;
                let tag_name = self.strings.read_interned(&mut self.cursor)?;
                self.element_stack.push(Element::new(tag_name));
                Ok(true)
            }

            END_TAG => {
                expect_type(event, type_tag, TYPE_STRING_INTERNED)?;
                if !self.has_open_element() {
                    return Err(AbxError::UnexpectedEndTag);
                }
                let tag_name = self.strings.read_interned(&mut self.cursor)?;
                let Some(element) = self.element_stack.pop() else {
                    return Err(AbxError::UnexpectedEndTag);
                };
                if element.tag() != tag_name {
                    return Err(AbxError::MismatchedEndTag {
                        expected: element.tag().to_owned(),
                        found: tag_name,
                    });
                }
                match self.element_stack.last_mut() {
                    Some(parent) => parent.push_child(element),
                    None => self.root = Some(element),
                }
                Ok(true)
            }

            TEXT => {
                expect_type(event, type_tag, TYPE_STRING)?;
                let value = read_string_raw(&mut self.cursor)?;
                // Whitespace-only text carries no document meaning.
                if value.trim().is_empty() {
                    return Ok(true);
                }
                match self.element_stack.last_mut() {
                    Some(element) => element.append_text(&value),
                    None => return Err(AbxError::TextOutsideElement),
                }
                Ok(true)
            }

            ATTRIBUTE => {
                if !self.has_open_element() {
                    return Err(AbxError::UnexpectedAttribute);
                }
                let name = self.strings.read_interned(&mut self.cursor)?;
                let value = self.decode_attribute_value(type_tag)?;
                let Some(element) = self.element_stack.last_mut() else {
                    return Err(AbxError::UnexpectedAttribute);
                };
                element.set_attribute(name, value);
                Ok(true)
            }

            _ => {
                self.skip_unknown_event(token)?;
                Ok(true)
            }
        }
    }

    /// Decode one typed attribute value to its textual representation.
    fn decode_attribute_value(&mut self, type_tag: u8) -> Result<String> {
        let value = match type_tag {
            TYPE_NULL => "null".to_owned(),
            TYPE_STRING => read_string_raw(&mut self.cursor)?,
            TYPE_STRING_INTERNED => self.strings.read_interned(&mut self.cursor)?,
            TYPE_INT => self.cursor.read_i32()?.to_string(),
            TYPE_INT_HEX => format!("{:x}", self.cursor.read_i32()?),
            TYPE_LONG => self.cursor.read_i64()?.to_string(),
            TYPE_LONG_HEX => format!("{:x}", self.cursor.read_i64()?),
            TYPE_FLOAT => self.cursor.read_f32()?.to_string(),
            TYPE_DOUBLE => self.cursor.read_f64()?.to_string(),
            TYPE_BOOLEAN_TRUE => "true".to_owned(),
            TYPE_BOOLEAN_FALSE => "false".to_owned(),
            TYPE_BYTES_HEX => hex::encode(self.read_blob()?),
            TYPE_BYTES_BASE64 => {
                base64::engine::general_purpose::STANDARD.encode(self.read_blob()?)
            }
            _ => return Err(AbxError::UnsupportedValueType(type_tag)),
        };
        Ok(value)
    }

    fn read_blob(&mut self) -> Result<&'a [u8]> {
        // Blob lengths are signed on the wire but sized by the unsigned
        // bit pattern.
        let length = self.cursor.read_i16()? as u16 as usize;
        self.cursor.read_bytes(length)
    }

    /// Discard an event with an unrecognized low nibble when its type tag is
    /// one of the simple skippable ones; anything else is fatal.
    fn skip_unknown_event(&mut self, token: u8) -> Result<()> {
        match token & 0xF0 {
            TYPE_NULL => Ok(()),
            TYPE_STRING | TYPE_STRING_INTERNED => {
                let length = self.cursor.read_u16()? as usize;
                self.cursor.skip(length)
            }
            TYPE_INT => self.cursor.skip(4),
            _ => Err(AbxError::UnsupportedEvent(token)),
        }
    }

    fn close_open_elements(&mut self) {
        while let Some(element) = self.element_stack.pop() {
            match self.element_stack.last_mut() {
                Some(parent) => parent.push_child(element),
                None => self.root = Some(element),
            }
        }
    }
}
