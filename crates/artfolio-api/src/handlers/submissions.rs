use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use artfolio_core::models::{MessageResponse, SubmissionRequest, SubmissionResponse};
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v2/submissions",
    tag = "submissions",
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "Artwork stored, recorded and announced", body = SubmissionResponse),
        (status = 400, description = "Missing or invalid fields, or the image could not be downloaded", body = MessageResponse),
        (status = 500, description = "Storage, persistence or publishing failed", body = MessageResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        assignment_id = ?request.assignment_id,
        student_id = ?request.student_id,
        operation = "create_submission"
    )
)]
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SubmissionRequest>,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let response = state.submissions.handle(&request).await?;
    Ok(Json(response))
}
