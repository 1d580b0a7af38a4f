//! Prompt builder: fixed system message + question with a bounded file summary.

use std::fmt::Write;

use file_extract::{EntryContent, FileData, TabularContent};

/// System instructions sent with every question.
pub const DEFAULT_SYSTEM: &str =
    "You are a helpful assistant for IIT Madras Data Science students.";

/// Data rows of a table shown to the model.
pub const MAX_SAMPLE_ROWS: usize = 3;

/// Characters of generic text shown to the model.
pub const MAX_SAMPLE_CHARS: usize = 100;

/// Summarizes uploaded data for the prompt.
///
/// Only the file name, table headers, the first [`MAX_SAMPLE_ROWS`] rows and
/// the first [`MAX_SAMPLE_CHARS`] characters of text are included, so the
/// context stays small regardless of upload size.
///
/// # Example
/// ```
/// # use answer_engine::prompt::build_context;
/// # use file_extract::{FileData, GenericContent};
/// let data = FileData::Generic {
///     filename: "notes.txt".into(),
///     content: GenericContent { file_type: "txt".into(), text: "hello".into() },
/// };
/// assert_eq!(build_context(&data), "File: notes.txt (Content sample: hello...)\n");
/// ```
pub fn build_context(data: &FileData) -> String {
    let mut out = String::new();
    match data {
        FileData::Zip { filename, contents } => {
            let _ = writeln!(out, "File: {filename}");
            out.push_str("Contents:\n");
            for entry in contents.iter() {
                match &entry.content {
                    EntryContent::Tabular(t) => {
                        let _ = writeln!(out, "- {} (CSV file)", entry.name);
                        let _ = writeln!(out, "  Headers: {}", t.headers.join(", "));
                        let _ = writeln!(out, "  Data sample: {:?}", sample_rows(t));
                    }
                    EntryContent::Generic(g) => {
                        let _ = writeln!(
                            out,
                            "- {} (Content sample: {}...)",
                            entry.name,
                            head_chars(&g.text, MAX_SAMPLE_CHARS)
                        );
                    }
                }
            }
        }
        FileData::Tabular { filename, content } => {
            let _ = writeln!(out, "File: {filename} (CSV)");
            let _ = writeln!(out, "Headers: {:?}", content.headers);
            let _ = writeln!(out, "Data sample: {:?}", sample_rows(content));
        }
        FileData::Generic { filename, content } => {
            let _ = writeln!(
                out,
                "File: {filename} (Content sample: {}...)",
                head_chars(&content.text, MAX_SAMPLE_CHARS)
            );
        }
    }
    out
}

/// Builds the user message around `question` and an optional file `context`.
///
/// # Example
/// ```
/// # use answer_engine::prompt::build_user_prompt;
/// let p = build_user_prompt("What is 2+2?", "");
/// assert!(p.contains("Question: What is 2+2?"));
/// assert!(p.contains("ONLY the answer value"));
/// ```
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helper for IIT Madras Online Degree in Data Science course.\n\
         \n\
         Task: Provide the answer to the following question from a graded assignment:\n\
         \n\
         Question: {question}\n\
         \n\
         {context}\n\
         Important: Your response must be ONLY the answer value, without any explanation or additional text.\n\
         The answer should be the exact value that would be entered in the assignment form.\n",
        question = question.trim(),
        context = context,
    )
}

fn sample_rows(t: &TabularContent) -> &[Vec<String>] {
    &t.rows[..t.rows.len().min(MAX_SAMPLE_ROWS)]
}

/// First `max` characters of `s`, never splitting a UTF-8 sequence.
fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
