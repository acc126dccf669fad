//! Typed projections over a reader's records: single rows, single columns,
//! key/value pairs, and string-named operations for callers that are driven
//! by configuration.
use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::error::{ReaderError, Result};
use crate::reader::Reader;
use crate::record::CsvRecord;
use crate::source::RowSource;

/// A column picked by position or by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Index(usize),
    Name(String),
}

impl From<usize> for Column {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

/// Prefix that forces a column argument to be read as a header name.
const NAME_PREFIX: char = '#';

/// Renders the form [`Column::from_str`] reads back.
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Index(index) => write!(f, "{index}"),
            Column::Name(name) if name.starts_with(NAME_PREFIX) || name.parse::<usize>().is_ok() => {
                write!(f, "{NAME_PREFIX}{name}")
            }
            Column::Name(name) => f.write_str(name),
        }
    }
}

/// Digits select a position; anything else is a header name. A leading `#`
/// always means a name, so `#1` picks the header called `1`.
impl FromStr for Column {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(NAME_PREFIX) {
            return Ok(Column::Name(name.to_string()));
        }
        Ok(s.parse::<usize>()
            .map_or_else(|_| Column::Name(s.to_string()), Column::Index))
    }
}

type Field = Option<String>;

impl<S: RowSource> Reader<S> {
    /// The `nth` record of a fresh traversal.
    pub fn fetch_one(&mut self, nth: usize) -> Result<Option<CsvRecord>> {
        self.records(&[])?.nth(nth).transpose()
    }

    /// Lazily yields one column of every record.
    ///
    /// Names need a header. With a header, every record has every column;
    /// without one, rows too short for the index are skipped.
    pub fn fetch_column(
        &mut self,
        column: impl Into<Column>,
    ) -> Result<impl Iterator<Item = Result<Field>> + '_> {
        let position = self.column_position(&column.into())?;
        Ok(self.records(&[])?.filter_map(move |record| match record {
            Ok(record) => record
                .get_index(position)
                .map(|field| Ok(field.map(str::to_string))),
            Err(err) => Some(Err(err)),
        }))
    }

    /// Lazily yields `(key, value)` pairs taken from two columns.
    ///
    /// Rows lacking the key column are skipped; a missing value is null.
    pub fn fetch_pairs(
        &mut self,
        key: impl Into<Column>,
        value: impl Into<Column>,
    ) -> Result<impl Iterator<Item = Result<(Field, Field)>> + '_> {
        let key = self.column_position(&key.into())?;
        let value = self.column_position(&value.into())?;
        Ok(self.records(&[])?.filter_map(move |record| match record {
            Ok(record) => record.get_index(key).map(|k| {
                let v = record.get_index(value).flatten();
                Ok((k.map(str::to_string), v.map(str::to_string)))
            }),
            Err(err) => Some(Err(err)),
        }))
    }

    /// Runs a named operation and renders its result as JSON.
    pub fn execute(&mut self, operation: &Operation) -> Result<Value> {
        let value = match operation {
            Operation::FetchOne(nth) => serde_json::to_value(self.fetch_one(*nth)?)?,
            Operation::FetchColumn(column) => {
                let values = self.fetch_column(column.clone())?.collect::<Result<Vec<_>>>()?;
                serde_json::to_value(values)?
            }
            Operation::FetchPairs(key, value) => {
                let pairs = self
                    .fetch_pairs(key.clone(), value.clone())?
                    .collect::<Result<Vec<_>>>()?;
                serde_json::to_value(pairs)?
            }
            Operation::FetchAll => serde_json::to_value(self.fetch_all()?)?,
            Operation::Count => Value::from(self.count()?),
            Operation::Header => serde_json::to_value(self.header()?.names())?,
        };
        Ok(value)
    }

    fn column_position(&mut self, column: &Column) -> Result<usize> {
        let header = self.header()?;
        match column {
            Column::Name(name) => header
                .position(name)
                .ok_or_else(|| ReaderError::ColumnNotFound(name.clone())),
            Column::Index(index) if !header.is_empty() && *index >= header.len() => {
                Err(ReaderError::ColumnNotFound(index.to_string()))
            }
            Column::Index(index) => Ok(*index),
        }
    }
}

/// Operations a reader can run by name.
///
/// Parsed from `name` or `name:arg[:arg]`, e.g. `fetch_one:2`,
/// `fetch_column:email`, `fetch_pairs:0:1`. Column arguments follow
/// [`Column`]'s parsing: `fetch_column:#2024` selects the header named
/// `2024` rather than position 2024.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FetchOne(usize),
    FetchColumn(Column),
    FetchPairs(Column, Column),
    FetchAll,
    Count,
    Header,
}

impl FromStr for Operation {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let unknown = || ReaderError::UnknownOperation(s.to_string());

        let column = |arg: &str| arg.parse::<Column>().unwrap_or_else(|never| match never {});

        match (name, args.as_slice()) {
            ("fetch_one", []) => Ok(Operation::FetchOne(0)),
            ("fetch_one", [nth]) => nth.parse().map(Operation::FetchOne).map_err(|_| unknown()),
            ("fetch_column", []) => Ok(Operation::FetchColumn(Column::Index(0))),
            ("fetch_column", [col]) => Ok(Operation::FetchColumn(column(*col))),
            ("fetch_pairs", []) => Ok(Operation::FetchPairs(Column::Index(0), Column::Index(1))),
            ("fetch_pairs", [key, value]) => {
                Ok(Operation::FetchPairs(column(*key), column(*value)))
            }
            ("fetch_all", []) => Ok(Operation::FetchAll),
            ("count", []) => Ok(Operation::Count),
            ("header", []) => Ok(Operation::Header),
            _ => Err(unknown()),
        }
    }
}
