use std::{io::Write, sync::Arc};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::bom::strip_bom;
use crate::error::{ReaderError, Result};
use crate::header::{is_blank, Header, HeaderCache};
use crate::record::{combine, CsvRecord};
use crate::source::{RowSource, SourceRows};

/// Lazily turns the rows of a [`RowSource`] into records.
///
/// The header offset is the only setting; the resolved header and the record
/// count are derived from it and cleared whenever it changes. Traversals
/// borrow the reader mutably, so the offset cannot change under one.
#[derive(Debug)]
pub struct Reader<S> {
    source: S,
    header_offset: Option<usize>,
    header: HeaderCache,
    nb_records: Option<usize>,
}

impl<S: RowSource> Reader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            header_offset: None,
            header: HeaderCache::default(),
            nb_records: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn header_offset(&self) -> Option<usize> {
        self.header_offset
    }

    /// Selects the row used as header, or none.
    ///
    /// Negative offsets are rejected with [`ReaderError::InvalidOffset`]. A
    /// different offset clears the cached header and record count.
    pub fn set_header_offset(&mut self, offset: Option<i64>) -> Result<&mut Self> {
        let offset = offset
            .map(|value| usize::try_from(value).map_err(|_| ReaderError::InvalidOffset(value)))
            .transpose()?;

        if offset != self.header_offset {
            debug!(from = ?self.header_offset, to = ?offset, "header offset changed");
            self.header_offset = offset;
            self.header.clear();
            self.nb_records = None;
        }

        Ok(self)
    }

    /// By-value form of [`Reader::set_header_offset`].
    pub fn with_header_offset(mut self, offset: Option<i64>) -> Result<Self> {
        self.set_header_offset(offset)?;
        Ok(self)
    }

    /// The header read from the source at the header offset, cached.
    pub fn header(&mut self) -> Result<Arc<Header>> {
        self.header.resolve(&mut self.source, self.header_offset, &[])
    }

    /// Starts a fresh traversal from the first row of the source.
    ///
    /// A non-empty `override_header` keys the records instead of the header
    /// row; the header row is still excluded when an offset is set.
    pub fn records(&mut self, override_header: &[String]) -> Result<Records<'_>> {
        let header = self
            .header
            .resolve(&mut self.source, self.header_offset, override_header)?;

        let bom_len = self.source.input_bom().map_or(0, |bom| bom.char_len());
        let enclosure = self.source.enclosure();
        let header_offset = self.header_offset;

        let records = SourceRows::rewind(&mut self.source)?
            .map_ok(move |(offset, row)| (offset, strip_bom(row, offset, bom_len, enclosure)))
            .filter_ok(|(offset, row)| {
                let blank = is_blank(row);
                if blank {
                    trace!(offset, "skipping blank row");
                }
                !blank
            })
            .filter_ok(move |(offset, _)| Some(*offset) != header_offset)
            .map_ok(move |(_, row)| combine(&header, row));

        Ok(Records {
            inner: Box::new(records),
        })
    }

    /// Number of records a traversal without override yields.
    ///
    /// Counted once by draining a traversal, then cached until the header
    /// offset changes.
    pub fn count(&mut self) -> Result<usize> {
        if let Some(count) = self.nb_records {
            return Ok(count);
        }

        let mut count = 0;
        for record in self.records(&[])? {
            record?;
            count += 1;
        }

        debug!(count, "counted records");
        self.nb_records = Some(count);
        Ok(count)
    }

    /// Collects every record. Meant for one-shot export.
    pub fn fetch_all(&mut self) -> Result<Vec<CsvRecord>> {
        self.records(&[])?.collect()
    }

    /// All records as a JSON array.
    pub fn to_json(&mut self) -> Result<String> {
        let records = self.fetch_all()?;
        Ok(serde_json::to_string(&records)?)
    }

    pub fn to_json_writer<W: Write>(&mut self, writer: W) -> Result<()> {
        let records = self.fetch_all()?;
        serde_json::to_writer(writer, &records)?;
        Ok(())
    }
}

/// A lazy traversal of records.
///
/// Rows are pulled from the source one at a time; nothing is buffered.
pub struct Records<'a> {
    inner: Box<dyn Iterator<Item = Result<CsvRecord>> + 'a>,
}

impl Records<'_> {
    fn failed(err: ReaderError) -> Self {
        Self {
            inner: Box::new(std::iter::once(Err(err))),
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<CsvRecord>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        // Rows may be filtered, so only the upper bound is known upstream.
        (0, self.inner.size_hint().1)
    }
}

impl<'a, S: RowSource> IntoIterator for &'a mut Reader<S> {
    type Item = Result<CsvRecord>;
    type IntoIter = Records<'a>;

    /// Same items as `records(&[])`; a header failure becomes the only item.
    fn into_iter(self) -> Self::IntoIter {
        self.records(&[]).unwrap_or_else(Records::failed)
    }
}
