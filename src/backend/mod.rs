//! Quiz backend module
//!
//! The front end owns no quiz logic: generation, scoring and storage happen in the
//! backend service. This module describes that HTTP contract as a trait, one method
//! per endpoint, with [`HttpBackend`] as the production implementation.

mod client;
pub mod models;
#[cfg(test)]
pub mod test_support;

use thiserror::Error;

pub use client::HttpBackend;
pub use models::{AnswerSubmission, Quiz, QuizResult, QuizSubmission};

/// Maximum characters of backend error text shown to users
pub const ERROR_PREVIEW_LEN: usize = 200;

/// Failure of one backend call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The HTTP exchange never completed (unreachable, reset, timeout)
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("backend returned HTTP {status}")]
    Backend {
        status: u16,
        error: Option<String>,
        details: Option<String>,
    },
}

impl ClientError {
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Backend error text (`error: details`) cut down for display
    pub fn preview(&self) -> Option<String> {
        let Self::Backend { error, details, .. } = self else {
            return None;
        };
        let text = match (error.as_deref(), details.as_deref()) {
            (Some(e), Some(d)) => format!("{e}: {d}"),
            (Some(t), None) | (None, Some(t)) => t.to_string(),
            (None, None) => return None,
        };
        Some(truncate(text.trim(), ERROR_PREVIEW_LEN))
    }
}

/// Truncate on a char boundary, marking the cut with an ellipsis
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One method per backend endpoint
#[allow(async_fn_in_trait)]
pub trait QuizBackend {
    /// `POST /api/quiz/generate`
    async fn generate(&self, topic: &str, number_of_questions: u32) -> Result<Quiz, ClientError>;

    /// `GET /api/quiz/list`
    async fn list(&self) -> Result<Vec<Quiz>, ClientError>;

    /// `GET /api/quiz/{id}`
    async fn quiz(&self, id: i64) -> Result<Quiz, ClientError>;

    /// `GET /api/quiz/results/{id}`
    async fn results(&self, id: i64) -> Result<Vec<QuizResult>, ClientError>;

    /// `POST /api/quiz/submit`
    async fn submit(&self, submission: &QuizSubmission) -> Result<QuizResult, ClientError>;

    /// `DELETE /api/quiz/{id}`
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}
