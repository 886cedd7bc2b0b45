//! Application state shared by handlers

use artfolio_services::SubmissionService;

pub struct AppState {
    pub submissions: SubmissionService,
}

impl AppState {
    pub fn new(submissions: SubmissionService) -> Self {
        Self { submissions }
    }
}
