use crate::error::{ReaderError, Result};
use crate::source::RawRow;

/// Per-field conversion settings applied to every tokenized record.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldOptions {
    pub null_string: Option<String>,
    pub ignore_null_bytes: bool,
    pub lossy: bool,
    /// Strip ASCII whitespace around every field.
    pub trim: bool,
}

impl FieldOptions {
    /// Decodes `record` into a raw row. Invalid UTF-8 fails unless lossy
    /// decoding was requested.
    pub(crate) fn parse(&self, record: &csv::ByteRecord, offset: usize) -> Result<RawRow> {
        record
            .iter()
            .map(|field| -> Result<Option<String>> {
                let field = if self.trim { field.trim_ascii() } else { field };
                let field = if self.lossy {
                    String::from_utf8_lossy(field)
                } else {
                    std::str::from_utf8(field)
                        .map_err(|_| ReaderError::InvalidUtf8 { offset })?
                        .into()
                };
                Ok(self.convert(&field))
            })
            .collect()
    }

    #[inline]
    fn convert(&self, field: &str) -> Option<String> {
        if Some(field) == self.null_string.as_deref() {
            None
        } else if self.ignore_null_bytes {
            Some(field.replace('\0', ""))
        } else {
            Some(field.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&[u8]]) -> csv::ByteRecord {
        csv::ByteRecord::from(fields.to_vec())
    }

    #[test]
    fn null_string_maps_to_none() {
        let options = FieldOptions {
            null_string: Some("NULL".into()),
            ..FieldOptions::default()
        };
        let row = options.parse(&record(&[b"a", b"NULL", b""]), 0).unwrap();
        assert_eq!(row, vec![Some("a".into()), None, Some(String::new())]);
    }

    #[test]
    fn strips_null_bytes() {
        let options = FieldOptions {
            ignore_null_bytes: true,
            ..FieldOptions::default()
        };
        let row = options.parse(&record(&[b"a\0b"]), 0).unwrap();
        assert_eq!(row, vec![Some("ab".into())]);
    }

    #[test]
    fn trims_before_null_matching() {
        let options = FieldOptions {
            null_string: Some("NULL".into()),
            trim: true,
            ..FieldOptions::default()
        };
        let row = options.parse(&record(&[b" NULL ", b"\tx\r\n"]), 0).unwrap();
        assert_eq!(row, vec![None, Some("x".into())]);
    }

    #[test]
    fn invalid_utf8() {
        let strict = FieldOptions::default();
        let err = strict.parse(&record(&[b"\xFF\xFEid"]), 0).unwrap_err();
        assert!(matches!(err, ReaderError::InvalidUtf8 { offset: 0 }));

        let lossy = FieldOptions {
            lossy: true,
            ..FieldOptions::default()
        };
        let row = lossy.parse(&record(&[b"\xFF\xFEid"]), 0).unwrap();
        assert_eq!(row, vec![Some("\u{fffd}\u{fffd}id".into())]);
    }
}
