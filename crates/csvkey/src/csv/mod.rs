mod builder;
mod parser;
mod source;

pub use builder::ReaderBuilder;
pub use source::CsvRowSource;

pub(crate) const READ_BUFFER_SIZE: usize = 16384;
