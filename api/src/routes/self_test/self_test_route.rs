use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::task;
use tracing::{error, info, instrument, warn};
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::{
    core::{
        app_state::AppState,
        upload::{Upload, extract_upload},
    },
    routes::solve::solve_response::SolveResponse,
};

pub const SAMPLE_CSV: &str = "extract.csv";
pub const SAMPLE_ZIP: &str = "sample.zip";
pub const SAMPLE_QUESTION: &str = r#"What is the value in the "answer" column of the CSV file?"#;

/// `GET /test`: packs the sample CSV into a zip and solves it end to end.
#[instrument(name = "self_test_route", skip_all, fields(dir = %state.test_files_dir.display()))]
pub async fn self_test_route(State(state): State<Arc<AppState>>) -> Response {
    let dir = state.test_files_dir.clone();
    let bytes = match task::spawn_blocking(move || ensure_sample_zip(&dir)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            warn!(error = %e, "sample csv missing");
            return status_error(
                StatusCode::NOT_FOUND,
                "Could not find or create test files".to_string(),
            );
        }
        Ok(Err(e)) => {
            error!(error = %e, "failed to prepare sample archive");
            return status_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        Err(e) => {
            error!(error = %e, "sample archive task failed");
            return status_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let upload = Upload {
        filename: SAMPLE_ZIP.to_string(),
        bytes: Bytes::from(bytes),
    };

    let result = match extract_upload(upload).await {
        Ok(data) => state
            .resolver
            .resolve(SAMPLE_QUESTION, Some(&data))
            .await
            .map_err(Into::into),
        Err(e) => Err(e),
    };

    match result {
        Ok(answer) => {
            info!(%answer, "self-test resolved");
            Json(SolveResponse { answer }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

fn status_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

/// Rebuilds `sample.zip` from `extract.csv` and returns the archive bytes.
///
/// The CSV is read first, so a missing fixture surfaces as `NotFound` and the
/// archive always reflects the current CSV.
fn ensure_sample_zip(dir: &Path) -> io::Result<Vec<u8>> {
    let csv = fs::read(dir.join(SAMPLE_CSV))?;

    let zip_path: PathBuf = dir.join(SAMPLE_ZIP);
    let mut writer = ZipWriter::new(File::create(&zip_path)?);
    writer.start_file(SAMPLE_CSV, SimpleFileOptions::default())?;
    writer.write_all(&csv)?;
    writer.finish()?;
    info!(path = %zip_path.display(), "sample archive written");

    fs::read(&zip_path)
}
