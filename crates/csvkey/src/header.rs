//! Header resolution and validation.
//!
//! A resolved header is shared by every record built from it, so record keys
//! are never cloned per row.
use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;
use itertools::Itertools;
use tracing::debug;

use crate::bom::strip_bom;
use crate::error::{ReaderError, Result};
use crate::source::{RawRow, RowSource};

/// Ordered, unique field names used to key records.
#[derive(Debug, Clone, Default)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize, RandomState>,
}

impl Header {
    /// Validates `names` and builds a header from them.
    ///
    /// Fails with [`ReaderError::InvalidHeader`] if any name repeats.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if let Some(duplicate) = names.iter().duplicates().next() {
            return Err(ReaderError::invalid_header(format!(
                "duplicate field name {duplicate:?}"
            )));
        }

        let positions = names
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();

        Ok(Self { names, positions })
    }

    /// Builds a header from a raw row, rejecting null fields.
    pub fn from_row(row: RawRow) -> Result<Self> {
        let names = row
            .into_iter()
            .enumerate()
            .map(|(position, field)| {
                field.ok_or_else(|| {
                    ReaderError::invalid_header(format!("field {position} is not a string"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for Header {}

impl<'a> IntoIterator for &'a Header {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Caches the header read from the source for the active header offset.
#[derive(Debug, Default, Clone)]
pub(crate) struct HeaderCache {
    resolved: Option<Arc<Header>>,
}

impl HeaderCache {
    pub(crate) fn clear(&mut self) {
        self.resolved = None;
    }

    /// Returns the header records should be keyed by.
    ///
    /// A non-empty `override_header` wins and leaves the cache alone.
    /// Otherwise the cached header is used, or the row at `header_offset` is
    /// read (with BOM stripping on row 0) and cached. No offset means an
    /// empty header.
    pub(crate) fn resolve<S: RowSource + ?Sized>(
        &mut self,
        source: &mut S,
        header_offset: Option<usize>,
        override_header: &[String],
    ) -> Result<Arc<Header>> {
        if !override_header.is_empty() {
            return Header::new(override_header.to_vec()).map(Arc::new);
        }

        if let Some(header) = &self.resolved {
            return Ok(Arc::clone(header));
        }

        let Some(offset) = header_offset else {
            return Ok(Arc::new(Header::default()));
        };

        let header = Arc::new(read_header(source, offset)?);
        debug!(offset, width = header.len(), "resolved header");
        self.resolved = Some(Arc::clone(&header));
        Ok(header)
    }
}

fn read_header<S: RowSource + ?Sized>(source: &mut S, offset: usize) -> Result<Header> {
    source.seek(offset)?;
    let row = match source.current_row()? {
        Some(row) if !is_blank(&row) => row,
        _ => return Err(ReaderError::MissingHeader { offset }),
    };

    let bom_len = source.input_bom().map_or(0, |bom| bom.char_len());
    Header::from_row(strip_bom(row, offset, bom_len, source.enclosure()))
}

/// An empty row, or the `[None]` a blank physical line produces.
pub(crate) fn is_blank(row: &RawRow) -> bool {
    matches!(row.as_slice(), [] | [None])
}
