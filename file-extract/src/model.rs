//! Per-request data produced by the extractors.
//!
//! Everything here is created fresh for a single upload and dropped with the
//! response. Nothing is cached between requests.

/// Parsed delimited-text data.
///
/// Header and row widths are independent: rows may be shorter (or longer)
/// than the header, so every index into a row must be bounds-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularContent {
    /// First record of the input.
    pub headers: Vec<String>,
    /// All records after the first.
    pub rows: Vec<Vec<String>>,
    /// Index of the first header literally equal to `answer`.
    pub answer_column: Option<usize>,
    /// Cell at `answer_column` in the first data row, when both exist.
    pub direct_answer: Option<String>,
    /// Decoded source text. Only kept for archive entries.
    pub raw: Option<String>,
}

impl TabularContent {
    /// Returns the direct answer only when it is non-empty.
    pub fn non_empty_answer(&self) -> Option<&str> {
        self.direct_answer.as_deref().filter(|a| !a.is_empty())
    }
}

/// Text decoded from a file that is not structurally parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericContent {
    /// Lowercase extension the upload was declared with (e.g. `txt`, `pdf`).
    pub file_type: String,
    /// Full decoded text, invalid UTF-8 replaced.
    pub text: String,
}

/// Content of a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Tabular(TabularContent),
    Generic(GenericContent),
}

/// Named archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: EntryContent,
}

/// Archive entries keyed by name, kept in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveContents {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry. A repeated name replaces the earlier content in place,
    /// so the first position of that name is kept.
    pub fn insert(&mut self, name: String, content: EntryContent) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.content = content,
            None => self.entries.push(ArchiveEntry { name, content }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntryContent> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter()
    }

    /// Tabular entries only, in enumeration order.
    pub fn tabular(&self) -> impl Iterator<Item = (&str, &TabularContent)> {
        self.entries.iter().filter_map(|e| match &e.content {
            EntryContent::Tabular(t) => Some((e.name.as_str(), t)),
            EntryContent::Generic(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of processing one upload, tagged by the extractor that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Zip {
        filename: String,
        contents: ArchiveContents,
    },
    Tabular {
        filename: String,
        content: TabularContent,
    },
    Generic {
        filename: String,
        content: GenericContent,
    },
}

impl FileData {
    pub fn filename(&self) -> &str {
        match self {
            FileData::Zip { filename, .. }
            | FileData::Tabular { filename, .. }
            | FileData::Generic { filename, .. } => filename,
        }
    }

    /// Short tag used in logs (`zip`, `csv` or the generic extension).
    pub fn kind_label(&self) -> &str {
        match self {
            FileData::Zip { .. } => "zip",
            FileData::Tabular { .. } => "csv",
            FileData::Generic { content, .. } => &content.file_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(answer: Option<&str>) -> EntryContent {
        EntryContent::Tabular(TabularContent {
            direct_answer: answer.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn archive_contents_keep_enumeration_order() {
        let mut c = ArchiveContents::new();
        c.insert("b.csv".into(), tab(None));
        c.insert("a.csv".into(), tab(Some("1")));
        c.insert("b.csv".into(), tab(Some("2")));

        let names: Vec<_> = c.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b.csv", "a.csv"]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("b.csv"), Some(&tab(Some("2"))));
    }

    #[test]
    fn empty_direct_answer_is_not_an_answer() {
        let t = TabularContent {
            direct_answer: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(t.non_empty_answer(), None);
    }
}
