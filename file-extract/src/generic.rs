use std::io::Read;

use tracing::debug;

use crate::{errors::Result, model::GenericContent};

/// Decodes the stream as UTF-8 (invalid bytes replaced) with no further parsing.
pub fn extract_generic<R: Read>(mut reader: R, file_type: &str) -> Result<GenericContent> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let text = String::from_utf8_lossy(&buf).into_owned();

    debug!(file_type, bytes = buf.len(), "decoded generic text");

    Ok(GenericContent {
        file_type: file_type.to_string(),
        text,
    })
}
