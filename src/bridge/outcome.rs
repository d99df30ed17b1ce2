// Bridge outcome types
// What an operation decided, before it becomes an HTTP response

use hyper::StatusCode;
use serde_json::{json, Value};

use crate::backend::{Quiz, QuizResult};

/// Pages the front end can render
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// Entry form, optionally with an error banner
    Index { error: Option<String> },
    Quiz { quiz: Quiz },
    Results { result: QuizResult },
    QuizList {
        quizzes: Vec<Quiz>,
        error: Option<String>,
    },
    Review {
        quiz: Quiz,
        results: Vec<QuizResult>,
        notice: Option<String>,
    },
}

/// Result of one bridge operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(Page),
    Redirect(&'static str),
    Json { status: StatusCode, body: Value },
}

impl Outcome {
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::Render(Page::Index {
            error: Some(message.into()),
        })
    }

    pub fn json_error(status: StatusCode, message: &str) -> Self {
        Self::Json {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn json_message(message: &str) -> Self {
        Self::Json {
            status: StatusCode::OK,
            body: json!({ "message": message }),
        }
    }
}
