use chrono::{DateTime, Local, SubsecRound};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Message returned with every successful submission
pub const SUBMISSION_SUCCESS_MESSAGE: &str = "Submission successful";

/// Inbound artwork submission.
///
/// Every field is optional at the serde level so that a missing field is reported
/// as a validation failure ("Missing required fields") instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// Assignment the artwork was submitted for
    #[validate(
        required,
        length(min = 1),
        custom(function = "crate::validation::validate_path_segment")
    )]
    pub assignment_id: Option<String>,
    /// Submitting student
    #[validate(
        required,
        length(min = 1),
        custom(function = "crate::validation::validate_path_segment")
    )]
    pub student_id: Option<String>,
    /// Optional grade level, stored as given
    #[serde(default)]
    pub grade_level: Option<String>,
    /// Location of the artwork image to download
    #[validate(required, length(min = 1), url)]
    pub image_url: Option<String>,
}

/// A request that passed validation; all required fields are present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub assignment_id: String,
    pub student_id: String,
    pub grade_level: Option<String>,
    pub image_url: String,
}

/// Persisted submission record.
///
/// The same JSON document is published as the submission event, so field names
/// are part of the downstream contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Submission {
    pub submission_id: Uuid,
    pub assignment_id: String,
    pub student_id: String,
    pub grade_level: Option<String>,
    /// Public URL of the stored artifact (not the URL the image was fetched from)
    pub image_url: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Local>,
}

impl Submission {
    /// Build a fresh record for a stored artifact.
    ///
    /// The submission id is generated here and is independent of the artifact key.
    pub fn new(request: &ValidatedSubmission, artifact_url: String) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            assignment_id: request.assignment_id.clone(),
            student_id: request.student_id.clone(),
            grade_level: request.grade_level.clone(),
            image_url: artifact_url,
            // Postgres timestamps keep microseconds
            created_at: Local::now().trunc_subsecs(6),
        }
    }
}

/// Response body for a successful submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub submission_id: Uuid,
    pub message: String,
}

impl SubmissionResponse {
    pub fn accepted(submission_id: Uuid) -> Self {
        Self {
            submission_id,
            message: SUBMISSION_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Body of every non-success response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
