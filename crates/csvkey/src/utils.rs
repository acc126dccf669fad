use std::{
    fs::File,
    io::{self, Read, Seek},
    path::Path,
};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::bom::{Bom, MAX_BOM_LEN};

/// Opens `path` for reading, decompressing `.gz` files into an anonymous
/// temporary file so the result can still be seeked.
pub fn open_path(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if !is_gzip {
        return Ok(file);
    }

    let mut decoded = tempfile::tempfile()?;
    let written = io::copy(&mut GzDecoder::new(file), &mut decoded)?;
    decoded.rewind()?;
    debug!(path = %path.display(), bytes = written, "decompressed gzip input");
    Ok(decoded)
}

/// Reports the BOM at the start of `readable` and leaves it rewound.
pub fn sniff_bom<R: Read + Seek>(readable: &mut R) -> io::Result<Option<Bom>> {
    readable.rewind()?;
    let mut prefix = Vec::with_capacity(MAX_BOM_LEN);
    readable
        .by_ref()
        .take(MAX_BOM_LEN as u64)
        .read_to_end(&mut prefix)?;
    readable.rewind()?;
    Ok(Bom::detect(&prefix))
}
