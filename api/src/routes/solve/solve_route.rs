use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use tracing::{info, instrument};

use crate::{
    core::{
        app_state::AppState,
        upload::{extract_upload, read_form, validate_question},
    },
    error_handler::{AppError, AppResult},
    routes::solve::solve_response::SolveResponse,
};

/// `POST /api/`: answers a question, optionally using an uploaded file.
///
/// Expects `multipart/form-data` with a `question` text field and an
/// optional `file` part.
#[instrument(name = "solve_route", skip_all)]
pub async fn solve_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SolveResponse>> {
    if !is_multipart(&headers) {
        return Err(AppError::UnsupportedMediaType);
    }

    let form = read_form(multipart?).await?;
    let question = validate_question(form.question)?;

    let data = match form.file {
        Some(upload) => Some(extract_upload(upload).await?),
        None => None,
    };

    info!(
        question_len = question.len(),
        file = data.as_ref().map(|d| d.kind_label()).unwrap_or("none"),
        "resolving question"
    );

    let answer = state.resolver.resolve(&question, data.as_ref()).await?;
    Ok(Json(SolveResponse { answer }))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
}
