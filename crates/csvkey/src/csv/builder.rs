use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use super::{parser::FieldOptions, source::CsvRowSource, READ_BUFFER_SIZE};
use crate::error::Result;
use crate::reader::Reader;
use crate::utils::{open_path, sniff_bom};

/// Builder for configuring and creating a [`Reader`] over CSV input.
///
/// This struct provides a fluent interface for setting up the tokenizer and
/// field conversion, and for choosing the header row.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    delimiter: u8,
    quote_char: u8,
    escape: Option<u8>,
    double_quote: bool,
    trim: csv::Trim,
    null_string: Option<String>,
    ignore_null_bytes: bool,
    lossy: bool,
    header_offset: Option<i64>,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
            escape: None,
            double_quote: true,
            trim: csv::Trim::None,
            null_string: None,
            ignore_null_bytes: false,
            lossy: false,
            header_offset: None,
        }
    }

    /// Sets the delimiter character for the CSV.
    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character, which is also the enclosure stripped after
    /// BOM removal.
    #[must_use]
    pub fn quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    #[must_use]
    pub fn escape(mut self, escape: Option<u8>) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn double_quote(mut self, double_quote: bool) -> Self {
        self.double_quote = double_quote;
        self
    }

    /// Sets the trimming mode for fields.
    #[must_use]
    pub fn trim(mut self, trim: csv::Trim) -> Self {
        self.trim = trim;
        self
    }

    /// Sets the string that should be interpreted as null.
    #[must_use]
    pub fn null_string(mut self, null_string: Option<String>) -> Self {
        self.null_string = null_string;
        self
    }

    #[must_use]
    pub fn ignore_null_bytes(mut self, ignore_null_bytes: bool) -> Self {
        self.ignore_null_bytes = ignore_null_bytes;
        self
    }

    /// Decode invalid UTF-8 with replacement characters instead of failing.
    #[must_use]
    pub fn lossy(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    /// Row to use as header; `None` leaves records unkeyed.
    #[must_use]
    pub fn header_offset(mut self, header_offset: Option<i64>) -> Self {
        self.header_offset = header_offset;
        self
    }

    /// Builds a reader over a seekable stream.
    pub fn from_reader<R: Read + Seek>(self, mut readable: R) -> Result<Reader<CsvRowSource<R>>> {
        let bom = sniff_bom(&mut readable)?;

        // Fields are trimmed after tokenizing, where quoted newlines can
        // still be counted.
        let mut tokenizer = csv::ReaderBuilder::new();
        tokenizer.has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote_char)
            .escape(self.escape)
            .double_quote(self.double_quote)
            .buffer_capacity(READ_BUFFER_SIZE);

        let options = FieldOptions {
            null_string: self.null_string,
            ignore_null_bytes: self.ignore_null_bytes,
            lossy: self.lossy,
            trim: matches!(self.trim, csv::Trim::Fields | csv::Trim::All),
        };

        let enclosure = char::from(self.quote_char);
        let source = CsvRowSource::new(&tokenizer, readable, options, bom, enclosure)?;
        Reader::new(source).with_header_offset(self.header_offset)
    }

    /// Builds a reader over a file, transparently decompressing `.gz` input.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<Reader<CsvRowSource<File>>> {
        let file = open_path(path.as_ref())?;
        self.from_reader(file)
    }
}
