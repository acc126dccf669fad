use std::sync::Arc;

use itertools::Itertools;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::header::Header;
use crate::source::RawRow;

/// A data row keyed by the header it was combined with.
///
/// Values follow header order and there is exactly one per header entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<Option<String>>,
}

impl Record {
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Value stored under `name`. `None` if the name is not in the header;
    /// `Some(None)` for a padded or null field.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.header
            .position(name)
            .map(|position| self.values[position].as_deref())
    }

    pub fn get_index(&self, position: usize) -> Option<Option<&str>> {
        self.values.get(position).map(Option::as_deref)
    }

    /// `(name, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// An item yielded by a record traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvRecord {
    /// No header was active; the row passes through as the source gave it.
    Row(RawRow),
    /// The row combined with a non-empty header.
    Keyed(Record),
}

impl CsvRecord {
    /// Field at `position`, whichever shape the record has.
    pub fn get_index(&self, position: usize) -> Option<Option<&str>> {
        match self {
            CsvRecord::Row(row) => row.get(position).map(Option::as_deref),
            CsvRecord::Keyed(record) => record.get_index(position),
        }
    }

    pub fn as_keyed(&self) -> Option<&Record> {
        match self {
            CsvRecord::Keyed(record) => Some(record),
            CsvRecord::Row(_) => None,
        }
    }

    pub fn into_row(self) -> RawRow {
        match self {
            CsvRecord::Row(row) => row,
            CsvRecord::Keyed(record) => record.into_values(),
        }
    }
}

impl Serialize for CsvRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CsvRecord::Row(row) => row.serialize(serializer),
            CsvRecord::Keyed(record) => record.serialize(serializer),
        }
    }
}

/// Keys `row` by `header`.
///
/// An empty header leaves the row unkeyed. Otherwise the row is padded with
/// nulls or truncated on the right to the header's width; surplus fields are
/// dropped without error.
pub(crate) fn combine(header: &Arc<Header>, row: RawRow) -> CsvRecord {
    let width = header.len();
    if width == 0 {
        return CsvRecord::Row(row);
    }

    let values = row
        .into_iter()
        .pad_using(width, |_| None)
        .take(width)
        .collect();

    CsvRecord::Keyed(Record {
        header: Arc::clone(header),
        values,
    })
}
