//! Request validation
//!
//! Validation runs before any I/O. A rejected request never reaches the fetcher,
//! the object store, the metadata store or the queue.

use std::sync::OnceLock;

use regex::Regex;
use validator::{Validate, ValidationError};

use crate::error::{AppError, MISSING_FIELDS_MESSAGE};
use crate::models::{SubmissionRequest, ValidatedSubmission};

pub const INVALID_IMAGE_URL_MESSAGE: &str = "Invalid image URL";
pub const INVALID_IDENTIFIER_MESSAGE: &str = "Invalid assignmentId or studentId";

/// Reject identifiers that would change the shape of an artifact key.
///
/// Assignment and student ids become key prefixes, so they must be a single path
/// segment.
pub fn validate_path_segment(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        // reported by the length rule
        return Ok(());
    }
    if value == "." || value == ".." || value.contains('/') || value.contains('\\') {
        return Err(ValidationError::new("path_segment"));
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(ValidationError::new("path_segment"));
    }
    Ok(())
}

/// Validate an inbound request and extract its required fields.
pub fn validate_submission(request: &SubmissionRequest) -> Result<ValidatedSubmission, AppError> {
    if let Err(errors) = request.validate() {
        let field_errors = errors.field_errors();

        let missing = field_errors
            .values()
            .flat_map(|errs| errs.iter())
            .any(|e| e.code == "required" || e.code == "length");
        if missing {
            return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
        if field_errors.contains_key("image_url") {
            return Err(AppError::Validation(INVALID_IMAGE_URL_MESSAGE.to_string()));
        }
        return Err(AppError::Validation(INVALID_IDENTIFIER_MESSAGE.to_string()));
    }

    match (
        request.assignment_id.as_ref(),
        request.student_id.as_ref(),
        request.image_url.as_ref(),
    ) {
        (Some(assignment_id), Some(student_id), Some(image_url)) => Ok(ValidatedSubmission {
            assignment_id: assignment_id.clone(),
            student_id: student_id.clone(),
            grade_level: request.grade_level.clone(),
            image_url: image_url.clone(),
        }),
        _ => Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
    }
}

fn sql_identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("identifier regex is valid")
    })
}

/// Whether `name` can be interpolated into SQL as a bare table name
pub fn is_sql_identifier(name: &str) -> bool {
    sql_identifier_regex().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        assignment_id: Option<&str>,
        student_id: Option<&str>,
        image_url: Option<&str>,
    ) -> SubmissionRequest {
        SubmissionRequest {
            assignment_id: assignment_id.map(String::from),
            student_id: student_id.map(String::from),
            grade_level: None,
            image_url: image_url.map(String::from),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_request_is_accepted() {
        let mut req = request(Some("A1"), Some("S1"), Some("https://ex.com/pic.jpg"));
        req.grade_level = Some("3".to_string());

        let validated = validate_submission(&req).unwrap();
        assert_eq!(validated.assignment_id, "A1");
        assert_eq!(validated.student_id, "S1");
        assert_eq!(validated.grade_level.as_deref(), Some("3"));
        assert_eq!(validated.image_url, "https://ex.com/pic.jpg");
    }

    #[test]
    fn test_grade_level_is_optional() {
        let req = request(Some("A1"), Some("S1"), Some("https://ex.com/pic.jpg"));
        assert!(validate_submission(&req).unwrap().grade_level.is_none());
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let cases = [
            request(None, Some("S1"), Some("https://ex.com/pic.jpg")),
            request(Some("A1"), None, Some("https://ex.com/pic.jpg")),
            request(Some("A1"), Some("S1"), None),
            request(None, None, None),
        ];
        for req in cases {
            let err = validate_submission(&req).unwrap_err();
            assert_eq!(message(err), "Missing required fields");
        }
    }

    #[test]
    fn test_empty_fields_count_as_missing() {
        let cases = [
            request(Some(""), Some("S1"), Some("https://ex.com/pic.jpg")),
            request(Some("A1"), Some(""), Some("https://ex.com/pic.jpg")),
            request(Some("A1"), Some("S1"), Some("")),
        ];
        for req in cases {
            let err = validate_submission(&req).unwrap_err();
            assert_eq!(message(err), "Missing required fields");
        }
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let req = request(Some("A1"), Some("S1"), Some("not a url"));
        let err = validate_submission(&req).unwrap_err();
        assert_eq!(message(err), "Invalid image URL");
    }

    #[test]
    fn test_identifiers_cannot_escape_key_prefix() {
        for bad in ["..", ".", "a/b", "a\\b", "../etc"] {
            let req = request(Some(bad), Some("S1"), Some("https://ex.com/pic.jpg"));
            let err = validate_submission(&req).unwrap_err();
            assert_eq!(message(err), "Invalid assignmentId or studentId");

            let req = request(Some("A1"), Some(bad), Some("https://ex.com/pic.jpg"));
            assert!(validate_submission(&req).is_err());
        }
    }

    #[test]
    fn test_sql_identifier() {
        assert!(is_sql_identifier("submissions"));
        assert!(is_sql_identifier("art_submissions_v2"));
        assert!(!is_sql_identifier("2submissions"));
        assert!(!is_sql_identifier("submissions; DROP TABLE x"));
        assert!(!is_sql_identifier(""));
    }
}
