use crate::{BinaryXmlDecoder, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

/// High-level converter for ABX to XML conversion
///
/// Every entry point buffers the complete input before decoding and writes
/// output only after the whole document decoded and rendered, so a failed
/// conversion never leaves partial XML behind.
pub struct AbxToXmlConverter;

impl AbxToXmlConverter {
    /// Convert in-memory ABX data to an XML string.
    ///
    /// This is the pure pipeline the other methods are built on.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    ///
    /// let abx_data = std::fs::read("input.abx").unwrap();
    /// let xml_string = AbxToXmlConverter::convert_bytes(&abx_data, false).unwrap();
    /// println!("{}", xml_string);
    /// ```
    pub fn convert_bytes(data: &[u8], multi_root: bool) -> Result<String> {
        let document = BinaryXmlDecoder::new(data, multi_root).decode()?;
        Ok(document.to_xml())
    }

    /// Convert ABX from a reader to a writer.
    ///
    /// The reader is drained before decoding begins; the writer sees either
    /// the complete XML or nothing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    /// use std::fs::File;
    ///
    /// let input = File::open("input.abx").unwrap();
    /// let output = File::create("output.xml").unwrap();
    /// AbxToXmlConverter::convert(input, output, false).unwrap();
    /// ```
    pub fn convert<R: Read, W: Write>(
        mut reader: R,
        mut writer: W,
        multi_root: bool,
    ) -> Result<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let xml = Self::convert_bytes(&data, multi_root)?;
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Convert an ABX file to an XML file.
    ///
    /// Passing the same path for both converts in place; the input is fully
    /// read before the output file is created, and it is only created once
    /// conversion succeeded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use abx2xml::AbxToXmlConverter;
    ///
    /// AbxToXmlConverter::convert_file("input.abx", "output.xml", false).unwrap();
    /// ```
    pub fn convert_file(input_path: &str, output_path: &str, multi_root: bool) -> Result<()> {
        let data = fs::read(input_path)?;
        let xml = Self::convert_bytes(&data, multi_root)?;
        Self::write_output(output_path, &xml)
    }

    /// Convert ABX from stdin to stdout.
    pub fn convert_stdin_stdout(multi_root: bool) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        Self::convert(stdin.lock(), stdout.lock(), multi_root)
    }

    /// Convert ABX from stdin to a file.
    pub fn convert_stdin_to_file(output_path: &str, multi_root: bool) -> Result<()> {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        let xml = Self::convert_bytes(&data, multi_root)?;
        Self::write_output(output_path, &xml)
    }

    /// Convert an ABX file to stdout.
    pub fn convert_file_to_stdout(input_path: &str, multi_root: bool) -> Result<()> {
        let data = fs::read(input_path)?;
        let xml = Self::convert_bytes(&data, multi_root)?;
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn write_output(path: &str, xml: &str) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
