use crate::bom::Bom;
use crate::error::Result;

/// A row as the tokenizer produced it: positional, nullable fields.
pub type RawRow = Vec<Option<String>>;

/// Seekable, indexed provider of raw rows.
///
/// Offsets are the source's own row numbering, starting at 0. A cursor
/// positioned past the last row reports `None`.
pub trait RowSource {
    /// Positions the cursor on row `offset`.
    fn seek(&mut self, offset: usize) -> Result<()>;

    /// Returns the row under the cursor without moving it.
    fn current_row(&mut self) -> Result<Option<RawRow>>;

    /// Moves the cursor to the following row.
    fn advance(&mut self);

    /// Returns the row under the cursor and moves past it.
    fn next_row(&mut self) -> Result<Option<RawRow>> {
        let row = self.current_row()?;
        self.advance();
        Ok(row)
    }

    /// The byte-order mark still in front of the first field of row 0, if
    /// any. Sources that drop the mark before decoding report `None`.
    fn input_bom(&self) -> Option<Bom> {
        None
    }

    /// Quote character used by the tokenizer.
    fn enclosure(&self) -> char {
        '"'
    }
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn seek(&mut self, offset: usize) -> Result<()> {
        (**self).seek(offset)
    }

    fn current_row(&mut self) -> Result<Option<RawRow>> {
        (**self).current_row()
    }

    fn advance(&mut self) {
        (**self).advance()
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        (**self).next_row()
    }

    fn input_bom(&self) -> Option<Bom> {
        (**self).input_bom()
    }

    fn enclosure(&self) -> char {
        (**self).enclosure()
    }
}

/// Rows held in memory.
///
/// Blank physical lines are represented as `[None]`. Every row handed out is
/// counted, which makes re-reads observable.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
    cursor: usize,
    bom: Option<Bom>,
    enclosure: Option<char>,
    reads: usize,
}

impl MemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Builds a source from non-null string fields.
    pub fn from_strings<I, R, F>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|f| Some(f.into())).collect())
                .collect(),
        )
    }

    #[must_use]
    pub fn with_bom(mut self, bom: Bom) -> Self {
        self.bom = Some(bom);
        self
    }

    #[must_use]
    pub fn with_enclosure(mut self, enclosure: char) -> Self {
        self.enclosure = Some(enclosure);
        self
    }

    /// Number of rows read from this source so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl RowSource for MemorySource {
    fn seek(&mut self, offset: usize) -> Result<()> {
        self.cursor = offset;
        Ok(())
    }

    fn current_row(&mut self) -> Result<Option<RawRow>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.reads += 1;
        }
        Ok(row)
    }

    fn advance(&mut self) {
        self.cursor = self.cursor.saturating_add(1);
    }

    fn input_bom(&self) -> Option<Bom> {
        self.bom
    }

    fn enclosure(&self) -> char {
        self.enclosure.unwrap_or('"')
    }
}

/// Pulls `(offset, row)` pairs from a source, starting at row 0.
pub(crate) struct SourceRows<'a, S: ?Sized> {
    source: &'a mut S,
    offset: usize,
    done: bool,
}

impl<'a, S: RowSource + ?Sized> SourceRows<'a, S> {
    pub(crate) fn rewind(source: &'a mut S) -> Result<Self> {
        source.seek(0)?;
        Ok(Self {
            source,
            offset: 0,
            done: false,
        })
    }
}

impl<S: RowSource + ?Sized> Iterator for SourceRows<'_, S> {
    type Item = Result<(usize, RawRow)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.source.next_row() {
            Ok(Some(row)) => {
                let offset = self.offset;
                self.offset += 1;
                Some(Ok((offset, row)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_and_read() {
        let mut source = MemorySource::from_strings([["a"], ["b"], ["c"]]);
        source.seek(1).unwrap();
        assert_eq!(source.current_row().unwrap(), Some(vec![Some("b".into())]));
        assert_eq!(source.next_row().unwrap(), Some(vec![Some("b".into())]));
        assert_eq!(source.next_row().unwrap(), Some(vec![Some("c".into())]));
        assert_eq!(source.next_row().unwrap(), None);
        assert_eq!(source.reads(), 3);
    }

    #[test]
    fn source_rows_restart_from_zero() {
        let mut source = MemorySource::from_strings([["a"], ["b"]]);
        source.seek(1).unwrap();

        let offsets: Vec<usize> = SourceRows::rewind(&mut source)
            .unwrap()
            .map(|item| item.unwrap().0)
            .collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn defaults() {
        let source = MemorySource::default();
        assert_eq!(source.input_bom(), None);
        assert_eq!(source.enclosure(), '"');
    }
}
