//! Lazy, header-keyed record reading over seekable row sources.
//!
//! A [`Reader`] pulls rows from a [`RowSource`] one at a time, strips the
//! byte-order mark from the first row, drops blank rows, skips the header
//! row, and keys what is left by the header.
//!
//! ```no_run
//! use csvkey::ReaderBuilder;
//!
//! let mut reader = ReaderBuilder::new()
//!     .header_offset(Some(0))
//!     .from_path("people.csv")?;
//!
//! for record in &mut reader {
//!     let record = record?;
//!     println!("{:?}", record.as_keyed().and_then(|r| r.get("name")));
//! }
//! # Ok::<(), csvkey::ReaderError>(())
//! ```
mod bom;
mod csv;
mod error;
mod header;
mod projection;
mod reader;
mod record;
mod source;
mod utils;

pub use crate::bom::Bom;
pub use crate::csv::{CsvRowSource, ReaderBuilder};
pub use crate::error::{ReaderError, Result};
pub use crate::header::Header;
pub use crate::projection::{Column, Operation};
pub use crate::reader::{Reader, Records};
pub use crate::record::{CsvRecord, Record};
pub use crate::source::{MemorySource, RawRow, RowSource};
