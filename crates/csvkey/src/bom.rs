/// Byte-order marks recognised at the start of an input stream.
///
/// Detection only looks at the raw bytes; stripping happens later, on the
/// first field of row 0, once the tokenizer has decoded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bom {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
}

// UTF-32LE must be probed before UTF-16LE since it shares the FF FE prefix.
const TABLE: [(Bom, &[u8]); 5] = [
    (Bom::Utf32Be, &[0x00, 0x00, 0xFE, 0xFF]),
    (Bom::Utf32Le, &[0xFF, 0xFE, 0x00, 0x00]),
    (Bom::Utf8, &[0xEF, 0xBB, 0xBF]),
    (Bom::Utf16Be, &[0xFE, 0xFF]),
    (Bom::Utf16Le, &[0xFF, 0xFE]),
];

/// Longest sequence in the table; callers read this many bytes to detect.
pub const MAX_BOM_LEN: usize = 4;

impl Bom {
    /// Returns the BOM that prefixes `bytes`, if any.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        TABLE
            .iter()
            .find(|(_, seq)| bytes.starts_with(seq))
            .map(|(bom, _)| *bom)
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        TABLE
            .iter()
            .find(|(bom, _)| bom == self)
            .map(|(_, seq)| *seq)
            .unwrap_or_default()
    }

    /// Number of characters the mark occupies once the first field has been
    /// decoded. A UTF-8 mark decodes to a single U+FEFF; the others are not
    /// valid UTF-8 and decode lossily to one character per byte.
    pub fn char_len(&self) -> usize {
        match self {
            Bom::Utf8 => 1,
            other => other.as_bytes().len(),
        }
    }
}

/// Removes the BOM from the first field of row 0.
///
/// Rows at any other offset are returned untouched. After removing the mark,
/// a first field that both starts and ends with `enclosure` loses one
/// enclosure character on each side.
pub(crate) fn strip_bom(
    mut row: Vec<Option<String>>,
    offset: usize,
    bom_len: usize,
    enclosure: char,
) -> Vec<Option<String>> {
    if offset != 0 || bom_len == 0 {
        return row;
    }

    if let Some(Some(first)) = row.first_mut() {
        let start = first
            .char_indices()
            .nth(bom_len)
            .map_or(first.len(), |(idx, _)| idx);
        first.drain(..start);

        // A lone enclosure is not a pair and stays.
        if first.len() >= 2 * enclosure.len_utf8()
            && first.starts_with(enclosure)
            && first.ends_with(enclosure)
        {
            first.pop();
            first.drain(..enclosure.len_utf8());
        }
    }

    row
}
