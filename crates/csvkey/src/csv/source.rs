use std::io::{self, Read, Seek, SeekFrom};

use tracing::trace;

use super::parser::FieldOptions;
use crate::bom::Bom;
use crate::error::Result;
use crate::source::{RawRow, RowSource};

/// Rows tokenized from a seekable CSV stream.
///
/// Offsets count physical lines the way they start records: a blank line
/// is a `[None]` row of its own, and a record spanning several lines through
/// quoted newlines takes one offset. Lines end at `\n`. Seeking backwards
/// rewinds the stream and reads forward again.
#[derive(Debug)]
pub struct CsvRowSource<R> {
    reader: csv::Reader<Tracked<R>>,
    options: FieldOptions,
    record: csv::ByteRecord,
    detected: Option<Bom>,
    // Byte the tokenizer starts at, past a UTF-8 mark.
    start: u64,
    enclosure: char,
    // Row the cursor is on.
    cursor: usize,
    // Rows produced since the last rewind.
    consumed: usize,
    // Blank rows still owed before the held record.
    blanks: u64,
    // `record` is tokenized but not yet counted.
    held: bool,
    // Zero-based physical line a following record would start on.
    next_line: u64,
    // The row at `cursor`, once read.
    current: Option<RawRow>,
}

enum Line {
    Blank,
    Record,
}

impl<R: Read + Seek> CsvRowSource<R> {
    pub(crate) fn new(
        builder: &csv::ReaderBuilder,
        readable: R,
        options: FieldOptions,
        bom: Option<Bom>,
        enclosure: char,
    ) -> Result<Self> {
        // The tokenizer would drop a UTF-8 mark on its own; starting past it
        // keeps quoting intact and leaves nothing for the row-0 stripper.
        let start = match bom {
            Some(Bom::Utf8) => Bom::Utf8.as_bytes().len() as u64,
            _ => 0,
        };

        let mut source = Self {
            reader: builder.from_reader(Tracked::new(readable)),
            options,
            record: csv::ByteRecord::new(),
            detected: bom,
            start,
            enclosure,
            cursor: 0,
            consumed: 0,
            blanks: 0,
            held: false,
            next_line: 0,
            current: None,
        };
        source.rewind()?;
        Ok(source)
    }

    /// The byte-order mark found at the start of the stream, whether or not
    /// it is still part of row 0.
    pub fn detected_bom(&self) -> Option<Bom> {
        self.detected
    }

    fn rewind(&mut self) -> Result<()> {
        trace!(start = self.start, "rewinding csv stream");
        let mut pos = csv::Position::new();
        pos.set_byte(self.start);
        self.reader.seek(pos)?;
        self.consumed = 0;
        self.blanks = 0;
        self.held = false;
        self.next_line = 0;
        self.current = None;
        Ok(())
    }

    /// Tokenizes the next record and works out how many blank lines the
    /// tokenizer skipped in front of it.
    fn read_record(&mut self) -> Result<bool> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(false);
        }

        let end = self.reader.position();
        let closed = self.reader.get_ref().byte_before(end.byte()) == Some(b'\n');
        let embedded = self.record.as_slice().iter().filter(|&&b| b == b'\n').count() as u64;

        let last_line = end.line().saturating_sub(1).saturating_sub(u64::from(closed));
        let first_line = last_line.saturating_sub(embedded);
        self.blanks = first_line.saturating_sub(self.next_line);
        self.next_line = last_line + 1;
        self.held = true;

        if self.blanks > 0 {
            trace!(blanks = self.blanks, line = first_line, "blank lines before record");
        }
        Ok(true)
    }

    fn step(&mut self) -> Result<Option<Line>> {
        if self.blanks == 0 && !self.held && !self.read_record()? {
            return Ok(None);
        }

        if self.blanks > 0 {
            self.blanks -= 1;
            return Ok(Some(Line::Blank));
        }
        self.held = false;
        Ok(Some(Line::Record))
    }

    fn fill(&mut self) -> Result<()> {
        if self.current.is_some() {
            return Ok(());
        }

        while self.consumed <= self.cursor {
            let Some(line) = self.step()? else {
                return Ok(());
            };
            self.consumed += 1;

            if self.consumed > self.cursor {
                self.current = Some(match line {
                    Line::Blank => vec![None],
                    Line::Record => self.options.parse(&self.record, self.cursor)?,
                });
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> RowSource for CsvRowSource<R> {
    fn seek(&mut self, offset: usize) -> Result<()> {
        if self.current.is_some() && offset == self.cursor {
            return Ok(());
        }

        self.current = None;
        if offset < self.consumed {
            self.rewind()?;
        }
        self.cursor = offset;
        Ok(())
    }

    fn current_row(&mut self) -> Result<Option<RawRow>> {
        self.fill()?;
        Ok(self.current.clone())
    }

    fn advance(&mut self) {
        self.current = None;
        self.cursor = self.cursor.saturating_add(1);
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        self.fill()?;
        let row = self.current.take();
        self.advance();
        Ok(row)
    }

    /// Only marks the tokenizer does not consume; a UTF-8 mark is skipped
    /// before tokenizing.
    fn input_bom(&self) -> Option<Bom> {
        self.detected.filter(|_| self.start == 0)
    }

    fn enclosure(&self) -> char {
        self.enclosure
    }
}

/// Passes reads through, keeping the last chunk handed out so the byte in
/// front of the tokenizer's position can be looked at.
#[derive(Debug)]
struct Tracked<R> {
    inner: R,
    // Stream offset of the next byte `inner` returns.
    offset: u64,
    chunk: Vec<u8>,
    chunk_start: u64,
}

impl<R> Tracked<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            chunk: Vec::new(),
            chunk_start: 0,
        }
    }

    fn byte_before(&self, pos: u64) -> Option<u8> {
        let idx = pos.checked_sub(1)?.checked_sub(self.chunk_start)?;
        self.chunk.get(usize::try_from(idx).ok()?).copied()
    }
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.chunk.clear();
            self.chunk.extend_from_slice(&buf[..n]);
            self.chunk_start = self.offset;
            self.offset += n as u64;
        }
        Ok(n)
    }
}

impl<R: Seek> Seek for Tracked<R> {
    // The kept chunk stays valid: it is addressed by absolute offset.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.offset = self.inner.seek(pos)?;
        Ok(self.offset)
    }
}
