//! Routes an upload to the matching extractor by its declared extension.

use std::io::Read;

use tracing::{info, instrument};

use crate::{
    archive::extract_archive,
    errors::{ExtractError, Result},
    generic::extract_generic,
    model::FileData,
    tabular::extract_tabular,
};

/// Extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["csv", "zip", "txt", "pdf", "xlsx", "json"];

/// Which extractor an upload goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Zip,
    Csv,
    /// Everything else in [`ALLOWED_EXTENSIONS`]; pdf/xlsx are read as plain
    /// text, not parsed.
    Text(String),
}

impl FileKind {
    /// Resolves the kind from a file name, rejecting unknown extensions.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = extension_of(filename).unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(FileKind::Zip),
            "csv" => Ok(FileKind::Csv),
            e if ALLOWED_EXTENSIONS.contains(&e) => Ok(FileKind::Text(e.to_string())),
            _ => Err(ExtractError::UnsupportedFileType(ext)),
        }
    }
}

/// Lowercased text after the last `.` of the final path component.
pub fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);
    base.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Returns `true` when the name carries one of [`ALLOWED_EXTENSIONS`].
pub fn is_allowed(filename: &str) -> bool {
    FileKind::from_filename(filename).is_ok()
}

/// Reduces a client-supplied name to a safe base name.
///
/// Directory components are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9._-]` is removed and leading dots/underscores are trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();
    cleaned.trim_start_matches(&['.', '_'][..]).to_string()
}

/// Checks the declared extension and runs the matching extractor.
///
/// The kind comes from the name as sent; the sanitized name is only what
/// [`FileData`] carries. The extension check happens before the stream is
/// touched, so rejected uploads are never read.
#[instrument(level = "info", skip(reader), fields(file = %filename))]
pub fn extract<R: Read>(filename: &str, reader: R) -> Result<FileData> {
    let kind = FileKind::from_filename(filename)?;
    let filename = sanitize_filename(filename);

    let data = match kind {
        FileKind::Zip => FileData::Zip {
            contents: extract_archive(reader)?,
            filename,
        },
        FileKind::Csv => FileData::Tabular {
            content: extract_tabular(reader)?,
            filename,
        },
        FileKind::Text(ext) => FileData::Generic {
            content: extract_generic(reader, &ext)?,
            filename,
        },
    };

    info!(kind = data.kind_label(), "upload extracted");
    Ok(data)
}
