//! Multipart form reading and off-thread extraction.

use axum::{body::Bytes, extract::Multipart};
use file_extract::FileData;
use tokio::task;
use tracing::debug;

use crate::error_handler::{AppError, AppResult, unsupported_type_message};

/// Fields of the solve form as received.
#[derive(Debug, Default)]
pub struct SolveForm {
    pub question: Option<String>,
    pub file: Option<Upload>,
}

/// Uploaded file with a non-empty client filename.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Reads `question` and `file` from the form, ignoring other fields.
///
/// A `file` part with an empty filename is treated as no upload. The first
/// occurrence of each field wins.
pub async fn read_form(mut multipart: Multipart) -> AppResult<SolveForm> {
    let mut form = SolveForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("question") if form.question.is_none() => {
                form.question = Some(field.text().await?);
            }
            Some("file") if form.file.is_none() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !filename.is_empty() {
                    debug!(%filename, bytes = bytes.len(), "received upload");
                    form.file = Some(Upload { filename, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validates the question: present and non-blank after trimming.
pub fn validate_question(question: Option<String>) -> AppResult<String> {
    let question = question
        .ok_or_else(|| AppError::Validation("Question parameter is required".into()))?;
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".into()));
    }
    Ok(question.to_string())
}

/// Rejects disallowed types, then runs extraction on the blocking pool.
pub async fn extract_upload(upload: Upload) -> AppResult<FileData> {
    if !file_extract::is_allowed(&upload.filename) {
        return Err(AppError::Validation(unsupported_type_message()));
    }

    let Upload { filename, bytes } = upload;
    let data = task::spawn_blocking(move || file_extract::extract(&filename, &bytes[..]))
        .await??;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_validation() {
        assert!(matches!(
            validate_question(None),
            Err(AppError::Validation(ref m)) if m == "Question parameter is required"
        ));
        assert!(matches!(
            validate_question(Some("   ".into())),
            Err(AppError::Validation(ref m)) if m == "Question cannot be empty"
        ));
        assert_eq!(validate_question(Some(" hi \n".into())).unwrap(), "hi");
    }

    #[tokio::test]
    async fn disallowed_type_is_rejected() {
        let upload = Upload {
            filename: "run.exe".into(),
            bytes: Bytes::from_static(b"MZ"),
        };
        assert!(matches!(
            extract_upload(upload).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn broken_archive_is_a_file_processing_error() {
        let upload = Upload {
            filename: "broken.zip".into(),
            bytes: Bytes::from_static(b"PK\x03\x04 nope"),
        };
        assert!(matches!(
            extract_upload(upload).await,
            Err(AppError::FileProcessing(_))
        ));
    }

    #[tokio::test]
    async fn csv_upload_is_extracted() {
        let upload = Upload {
            filename: "q.csv".into(),
            bytes: Bytes::from_static(b"id,answer\n1,42\n"),
        };
        let data = extract_upload(upload).await.unwrap();
        assert_eq!(data.filename(), "q.csv");
    }
}
