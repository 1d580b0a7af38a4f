//! Structured extraction for uploaded files.
//!
//! Entry point: [`extract`]. It picks an extractor from the declared file
//! extension and returns a [`FileData`] tagged by the branch that ran:
//!
//! - `zip`  → [`archive::extract_archive`], every `*.csv` entry parsed as a table
//! - `csv`  → [`tabular::extract_tabular`]
//! - other allowed types → [`generic::extract_generic`] (lossy UTF-8 text)
//!
//! Tables whose header row contains a column literally named `answer` carry
//! a *direct answer*: the first data row's cell in that column.

pub mod archive;
pub mod dispatch;
pub mod errors;
pub mod generic;
pub mod model;
pub mod tabular;

pub use dispatch::{ALLOWED_EXTENSIONS, FileKind, extract, is_allowed, sanitize_filename};
pub use errors::ExtractError;
pub use model::{
    ArchiveContents, ArchiveEntry, EntryContent, FileData, GenericContent, TabularContent,
};
