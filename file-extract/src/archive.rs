//! ZIP extraction.
//!
//! The upload is spooled into an anonymous temp file so `ZipArchive` can
//! seek. The file has no name on disk and is removed when the handle drops,
//! which covers the success, parse-failure and early-return paths alike.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, info, instrument};
use zip::ZipArchive;

use crate::{
    dispatch::extension_of,
    errors::Result,
    generic::extract_generic,
    model::{ArchiveContents, EntryContent},
    tabular::parse_tabular,
};

/// Enumerates the archive and parses every entry.
///
/// - `*.csv` (any case) → [`EntryContent::Tabular`] with `raw` attached.
/// - other files → [`EntryContent::Generic`] with lossily decoded text.
/// - directories are skipped.
///
/// Any structural error aborts the whole extraction; no partial mapping is
/// returned.
#[instrument(level = "info", skip_all)]
pub fn extract_archive<R: Read>(mut reader: R) -> Result<ArchiveContents> {
    let mut spool = tempfile::tempfile()?;
    let spooled = io::copy(&mut reader, &mut spool)?;
    spool.seek(SeekFrom::Start(0))?;

    let mut archive = ZipArchive::new(spool)?;
    let mut contents = ArchiveContents::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;

        let content = if is_tabular_name(&name) {
            let text = String::from_utf8_lossy(&buf).into_owned();
            let mut table = parse_tabular(&text)?;
            table.raw = Some(text);
            EntryContent::Tabular(table)
        } else {
            let file_type = extension_of(&name).unwrap_or_default();
            EntryContent::Generic(extract_generic(buf.as_slice(), &file_type)?)
        };

        debug!(entry = %name, bytes = buf.len(), "archive entry extracted");
        contents.insert(name, content);
    }

    info!(bytes = spooled, entries = contents.len(), "archive extracted");
    Ok(contents)
}

fn is_tabular_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}
